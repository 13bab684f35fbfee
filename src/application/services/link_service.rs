//! Link management service: the four engine operations behind one handle.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::application::services::link_allocator::{AllocationPolicy, LinkAllocator};
use crate::application::services::link_resolver::{LinkResolver, Resolution};
use crate::domain::access_worker::AccessRecorder;
use crate::domain::entities::{Link, LinkPage};
use crate::domain::repositories::LinkStore;
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Largest page a single list call may return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Service for creating, resolving, inspecting, deleting and listing links.
///
/// Built by explicit composition: the store, generator and access recorder
/// are passed in, nothing is looked up from global state.
pub struct LinkService {
    store: Arc<dyn LinkStore>,
    allocator: LinkAllocator,
    resolver: LinkResolver,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        store: Arc<dyn LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        recorder: AccessRecorder,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            allocator: LinkAllocator::new(store.clone(), generator, policy),
            resolver: LinkResolver::new(store.clone(), recorder),
            store,
        }
    }

    /// Creates a short link. See [`LinkAllocator::create`].
    pub async fn create_link(
        &self,
        target: &str,
        custom_code: Option<&str>,
    ) -> Result<Link, AppError> {
        self.allocator.create(target, custom_code).await
    }

    /// Resolves a code and dispatches its access increment.
    /// See [`LinkResolver::resolve`].
    pub async fn resolve(&self, code: &str) -> Result<Resolution, AppError> {
        self.resolver.resolve(code).await
    }

    /// Retrieves a link by code without counting an access.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the code.
    pub async fn get_link(&self, code: &str) -> Result<Link, AppError> {
        self.store.get(code).await?.ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })
    }

    /// Deletes a link by id, freeing its code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn delete_link(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "id": id }),
            ));
        }

        info!(link_id = id, "Link deleted");
        Ok(())
    }

    /// Lists links by creation time, oldest first.
    ///
    /// `count` is expected to be within `1..=MAX_PAGE_SIZE`; values outside
    /// that range are clamped.
    pub async fn list_links(&self, offset: u64, count: u32) -> Result<LinkPage, AppError> {
        self.store
            .list(offset, count.clamp(1, MAX_PAGE_SIZE))
            .await
    }

    /// Checks that the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.store.ping().await
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.allocator.policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access_worker::access_channel;
    use crate::domain::repositories::MockLinkStore;
    use crate::utils::code_generator::MockCodeGenerator;
    use chrono::Utc;

    fn service(store: MockLinkStore) -> LinkService {
        let (recorder, _rx) = access_channel(8);
        LinkService::new(
            Arc::new(store),
            Arc::new(MockCodeGenerator::new()),
            recorder,
            AllocationPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_get_link_does_not_count_access() {
        let mut store = MockLinkStore::new();
        store.expect_get().times(1).returning(|code| {
            Ok(Some(Link::new(
                2,
                code.to_string(),
                "https://example.com".to_string(),
                Utc::now(),
            )))
        });
        store.expect_increment_access().times(0);

        let link = service(store).get_link("info").await.unwrap();

        assert_eq!(link.code, "info");
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut store = MockLinkStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));

        let result = service(store).get_link("nothing").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_link_success() {
        let mut store = MockLinkStore::new();
        store
            .expect_delete()
            .withf(|id| *id == 5)
            .times(1)
            .returning(|_| Ok(true));

        assert!(service(store).delete_link(5).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_link_not_found() {
        let mut store = MockLinkStore::new();
        store.expect_delete().times(1).returning(|_| Ok(false));

        let result = service(store).delete_link(5).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_links_clamps_count() {
        let mut store = MockLinkStore::new();
        store
            .expect_list()
            .withf(|offset, count| *offset == 20 && *count == MAX_PAGE_SIZE)
            .times(1)
            .returning(|_, _| {
                Ok(LinkPage {
                    links: vec![],
                    total: 0,
                })
            });
        store
            .expect_list()
            .withf(|_, count| *count == 1)
            .times(1)
            .returning(|_, _| {
                Ok(LinkPage {
                    links: vec![],
                    total: 0,
                })
            });

        let service = service(store);
        service.list_links(20, 5_000).await.unwrap();
        service.list_links(0, 0).await.unwrap();
    }
}
