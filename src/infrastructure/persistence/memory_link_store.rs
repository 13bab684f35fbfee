//! In-process implementation of the link store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{Link, LinkPage};
use crate::domain::repositories::{InsertOutcome, LinkStore};
use crate::error::AppError;

/// In-memory link store backed by two `DashMap`s.
///
/// `codes` maps a code to the id holding it and is the uniqueness gate: an
/// insert claims the code through the entry API while the shard is locked.
/// `links` holds the records by id, so increments lock only the shard of the
/// link being counted. Ids come from a monotonic counter and are never reused.
///
/// Lock order is always `codes` then `links`; no path holds a `links` guard
/// while acquiring a `codes` guard.
#[derive(Debug)]
pub struct InMemoryLinkStore {
    codes: DashMap<String, i64>,
    links: DashMap<i64, Link>,
    next_id: AtomicI64,
}

impl InMemoryLinkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            codes: DashMap::new(),
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of live links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl Default for InMemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn try_insert(&self, code: &str, target: &str) -> Result<InsertOutcome, AppError> {
        match self.codes.entry(code.to_owned()) {
            Entry::Occupied(_) => Ok(InsertOutcome::CodeTaken),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let link = Link::new(id, code.to_owned(), target.to_owned(), Utc::now());

                self.links.insert(id, link.clone());
                slot.insert(id);

                Ok(InsertOutcome::Inserted(link))
            }
        }
    }

    async fn get(&self, code: &str) -> Result<Option<Link>, AppError> {
        let Some(id) = self.codes.get(code).map(|entry| *entry.value()) else {
            return Ok(None);
        };

        Ok(self.links.get(&id).map(|entry| entry.value().clone()))
    }

    async fn increment_access(&self, id: i64) -> Result<bool, AppError> {
        let Some(mut link) = self.links.get_mut(&id) else {
            return Ok(false);
        };

        link.record_access(Utc::now());
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let Some((_, link)) = self.links.remove(&id) else {
            return Ok(false);
        };

        // Free the code only while it still points at this link.
        self.codes.remove_if(&link.code, |_, owner| *owner == id);
        Ok(true)
    }

    async fn list(&self, offset: u64, count: u32) -> Result<LinkPage, AppError> {
        let mut all: Vec<Link> = self.links.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = all.len() as u64;
        let links = all
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(count as usize)
            .collect();

        Ok(LinkPage { links, total })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
