//! Link creation: target validation, code selection and atomic insertion.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entities::Link;
use crate::domain::repositories::{InsertOutcome, LinkStore};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, validate_custom_code};
use crate::utils::target_validator::validate_target;

/// Default number of generated candidates tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Rules applied when allocating a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    /// Reject loopback and private-network targets.
    pub strict_targets: bool,
    /// Upper bound on generated candidates per request.
    pub max_attempts: u32,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self {
            strict_targets: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Creates links with either a caller-supplied or a generated code.
///
/// The allocator never checks availability before writing. Every candidate
/// goes straight to [`LinkStore::try_insert`], whose outcome is the only
/// authority on whether the code was free.
pub struct LinkAllocator {
    store: Arc<dyn LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    policy: AllocationPolicy,
}

impl LinkAllocator {
    pub fn new(
        store: Arc<dyn LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        policy: AllocationPolicy,
    ) -> Self {
        Self {
            store,
            generator,
            policy,
        }
    }

    pub fn policy(&self) -> AllocationPolicy {
        self.policy
    }

    /// Creates a new link for `target`.
    ///
    /// # Code Selection
    ///
    /// - With `custom_code`, the code is format-checked and inserted once. A
    ///   taken code is reported as a conflict; no generated code is substituted.
    /// - Without it, up to `max_attempts` generated candidates are inserted
    ///   until one succeeds.
    ///
    /// # Errors
    ///
    /// - [`AppError::RejectedTarget`] if the target fails the safety policy
    /// - [`AppError::RejectedCodeFormat`] if the custom code is malformed
    /// - [`AppError::Conflict`] if the custom code is already in use
    /// - [`AppError::Exhausted`] if every generated candidate collided
    /// - Storage errors from the store, unchanged
    pub async fn create(&self, target: &str, custom_code: Option<&str>) -> Result<Link, AppError> {
        validate_target(target, self.policy.strict_targets)?;

        let link = match custom_code {
            Some(code) => self.insert_custom(target, code).await?,
            None => self.insert_generated(target).await?,
        };

        metrics::counter!("links_created_total").increment(1);
        info!(link_id = link.id, code = %link.code, "Link created");

        Ok(link)
    }

    async fn insert_custom(&self, target: &str, code: &str) -> Result<Link, AppError> {
        validate_custom_code(code)?;

        match self.store.try_insert(code, target).await? {
            InsertOutcome::Inserted(link) => Ok(link),
            InsertOutcome::CodeTaken => {
                debug!(code, "Custom code already taken");
                Err(AppError::conflict(code))
            }
        }
    }

    async fn insert_generated(&self, target: &str) -> Result<Link, AppError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            let code = self.generator.next_code();

            match self.store.try_insert(&code, target).await? {
                InsertOutcome::Inserted(link) => return Ok(link),
                InsertOutcome::CodeTaken => {
                    metrics::counter!("link_code_collisions_total").increment(1);
                    debug!(code, attempt, "Generated code collided");
                }
            }
        }

        warn!(
            attempts = max_attempts,
            "No free code found within the attempt bound"
        );
        Err(AppError::Exhausted {
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkStore;
    use crate::utils::code_generator::MockCodeGenerator;
    use crate::utils::target_validator::TargetRejection;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn stored(id: i64, code: &str, target: &str) -> Link {
        Link::new(id, code.to_string(), target.to_string(), Utc::now())
    }

    fn allocator(
        store: MockLinkStore,
        generator: MockCodeGenerator,
        policy: AllocationPolicy,
    ) -> LinkAllocator {
        LinkAllocator::new(Arc::new(store), Arc::new(generator), policy)
    }

    fn strict() -> AllocationPolicy {
        AllocationPolicy {
            strict_targets: true,
            ..AllocationPolicy::default()
        }
    }

    #[tokio::test]
    async fn test_create_with_generated_code() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();

        generator
            .expect_next_code()
            .times(1)
            .returning(|| "Ab3dE6gH".to_string());
        store
            .expect_try_insert()
            .withf(|code, target| code == "Ab3dE6gH" && target == "https://example.com/path")
            .times(1)
            .returning(|code, target| Ok(InsertOutcome::Inserted(stored(1, code, target))));

        let link = allocator(store, generator, AllocationPolicy::default())
            .create("https://example.com/path", None)
            .await
            .unwrap();

        assert_eq!(link.code, "Ab3dE6gH");
        assert_eq!(link.target, "https://example.com/path");
        assert_eq!(link.access_count, 0);
    }

    #[tokio::test]
    async fn test_create_retries_after_collision() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();

        let calls = AtomicUsize::new(0);
        generator.expect_next_code().times(3).returning(move || {
            format!("code000{}", calls.fetch_add(1, Ordering::SeqCst))
        });
        store
            .expect_try_insert()
            .times(3)
            .returning(|code, target| {
                if code == "code0002" {
                    Ok(InsertOutcome::Inserted(stored(7, code, target)))
                } else {
                    Ok(InsertOutcome::CodeTaken)
                }
            });

        let link = allocator(store, generator, AllocationPolicy::default())
            .create("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.code, "code0002");
    }

    #[tokio::test]
    async fn test_create_exhausted_after_configured_attempts() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();

        generator
            .expect_next_code()
            .times(4)
            .returning(|| "same1234".to_string());
        store
            .expect_try_insert()
            .times(4)
            .returning(|_, _| Ok(InsertOutcome::CodeTaken));

        let policy = AllocationPolicy {
            strict_targets: false,
            max_attempts: 4,
        };
        let result = allocator(store, generator, policy)
            .create("https://example.com", None)
            .await;

        assert!(matches!(result, Err(AppError::Exhausted { attempts: 4 })));
    }

    #[tokio::test]
    async fn test_create_with_custom_code() {
        let mut store = MockLinkStore::new();
        let generator = MockCodeGenerator::new();

        store
            .expect_try_insert()
            .withf(|code, _| code == "my-link_1")
            .times(1)
            .returning(|code, target| Ok(InsertOutcome::Inserted(stored(3, code, target))));

        let link = allocator(store, generator, AllocationPolicy::default())
            .create("https://example.com", Some("my-link_1"))
            .await
            .unwrap();

        assert_eq!(link.code, "my-link_1");
    }

    #[tokio::test]
    async fn test_custom_code_conflict_does_not_fall_back() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();

        generator.expect_next_code().times(0);
        store
            .expect_try_insert()
            .times(1)
            .returning(|_, _| Ok(InsertOutcome::CodeTaken));

        let result = allocator(store, generator, AllocationPolicy::default())
            .create("https://example.com", Some("taken"))
            .await;

        match result {
            Err(AppError::Conflict { code }) => assert_eq!(code, "taken"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_custom_code_format_rejected_before_store() {
        for policy in [AllocationPolicy::default(), strict()] {
            for code in ["ab", "test@123"] {
                let mut store = MockLinkStore::new();
                store.expect_try_insert().times(0);

                let result = allocator(store, MockCodeGenerator::new(), policy)
                    .create("https://example.com", Some(code))
                    .await;

                assert!(
                    matches!(result, Err(AppError::RejectedCodeFormat { .. })),
                    "{code}"
                );
            }
        }
    }

    #[tokio::test]
    async fn test_unsafe_target_rejected_before_anything_else() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();
        store.expect_try_insert().times(0);
        generator.expect_next_code().times(0);

        let result = allocator(store, generator, AllocationPolicy::default())
            .create("javascript:alert(1)", Some("ab"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::RejectedTarget(TargetRejection::UnsupportedScheme(_)))
        ));
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_private_targets() {
        let mut store = MockLinkStore::new();
        store.expect_try_insert().times(0);

        let result = allocator(store, MockCodeGenerator::new(), strict())
            .create("http://192.168.1.1", Some("router"))
            .await;

        assert!(matches!(
            result,
            Err(AppError::RejectedTarget(TargetRejection::ForbiddenHost(_)))
        ));
    }

    #[tokio::test]
    async fn test_lenient_policy_accepts_localhost() {
        let mut store = MockLinkStore::new();
        store
            .expect_try_insert()
            .times(1)
            .returning(|code, target| Ok(InsertOutcome::Inserted(stored(1, code, target))));

        let link = allocator(store, MockCodeGenerator::new(), AllocationPolicy::default())
            .create("http://localhost:3000", Some("dev-app"))
            .await
            .unwrap();

        assert_eq!(link.target, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_storage_error_propagates_without_retry() {
        let mut store = MockLinkStore::new();
        let mut generator = MockCodeGenerator::new();

        generator
            .expect_next_code()
            .times(1)
            .returning(|| "abcdefgh".to_string());
        store
            .expect_try_insert()
            .times(1)
            .returning(|_, _| Err(AppError::unavailable("pool timed out")));

        let result = allocator(store, generator, AllocationPolicy::default())
            .create("https://example.com", None)
            .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }
}
