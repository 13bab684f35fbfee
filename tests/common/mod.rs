#![allow(dead_code)]

use async_trait::async_trait;
use shortlink_engine::application::services::{AllocationPolicy, LinkService};
use shortlink_engine::domain::access_event::AccessEvent;
use shortlink_engine::domain::access_worker::{
    AccessWorkerSettings, access_channel, run_access_worker,
};
use shortlink_engine::domain::entities::{Link, LinkPage};
use shortlink_engine::domain::repositories::{InsertOutcome, LinkStore};
use shortlink_engine::error::AppError;
use shortlink_engine::infrastructure::persistence::InMemoryLinkStore;
use shortlink_engine::state::AppState;
use shortlink_engine::utils::code_generator::RandomCodeGenerator;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

pub const TEST_QUEUE_CAPACITY: usize = 1_000;

pub fn fast_worker_settings() -> AccessWorkerSettings {
    AccessWorkerSettings {
        concurrency: 8,
        retry_delay: Duration::from_millis(1),
    }
}

/// Service over `store` with the access queue left undrained.
pub fn create_test_service(
    store: Arc<dyn LinkStore>,
    policy: AllocationPolicy,
) -> (LinkService, mpsc::Receiver<AccessEvent>) {
    let (recorder, rx) = access_channel(TEST_QUEUE_CAPACITY);
    let service = LinkService::new(
        store,
        Arc::new(RandomCodeGenerator::new()),
        recorder,
        policy,
    );
    (service, rx)
}

/// Service over `store` with a running access worker.
///
/// Drop every clone of the service, then await the handle to be sure all
/// dispatched increments have been applied.
pub fn spawn_test_service(
    store: Arc<dyn LinkStore>,
    policy: AllocationPolicy,
) -> (Arc<LinkService>, JoinHandle<()>) {
    let (service, rx) = create_test_service(store.clone(), policy);
    let worker = tokio::spawn(run_access_worker(rx, store, fast_worker_settings()));
    (Arc::new(service), worker)
}

/// HTTP state over a fresh in-memory store, with a running access worker.
pub fn create_test_state() -> (AppState, Arc<InMemoryLinkStore>, JoinHandle<()>) {
    let store = Arc::new(InMemoryLinkStore::new());
    let (recorder, rx) = access_channel(TEST_QUEUE_CAPACITY);
    let service = LinkService::new(
        store.clone(),
        Arc::new(RandomCodeGenerator::new()),
        recorder.clone(),
        AllocationPolicy::default(),
    );
    let worker = tokio::spawn(run_access_worker(
        rx,
        store.clone(),
        fast_worker_settings(),
    ));

    (
        AppState::new(Arc::new(service), recorder),
        store,
        worker,
    )
}

/// HTTP state over any store, with the access queue left undrained.
pub fn create_state_with_store(
    store: Arc<dyn LinkStore>,
) -> (AppState, mpsc::Receiver<AccessEvent>) {
    let (recorder, rx) = access_channel(TEST_QUEUE_CAPACITY);
    let service = LinkService::new(
        store,
        Arc::new(RandomCodeGenerator::new()),
        recorder.clone(),
        AllocationPolicy::default(),
    );
    (AppState::new(Arc::new(service), recorder), rx)
}

/// Store whose backend is down. Counts list calls so tests can check that
/// nothing scans link data.
#[derive(Default)]
pub struct UnreachableStore {
    pub list_calls: AtomicUsize,
}

impl UnreachableStore {
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkStore for UnreachableStore {
    async fn try_insert(&self, _code: &str, _target: &str) -> Result<InsertOutcome, AppError> {
        Err(AppError::unavailable("connection refused"))
    }

    async fn get(&self, _code: &str) -> Result<Option<Link>, AppError> {
        Err(AppError::unavailable("connection refused"))
    }

    async fn increment_access(&self, _id: i64) -> Result<bool, AppError> {
        Err(AppError::unavailable("connection refused"))
    }

    async fn delete(&self, _id: i64) -> Result<bool, AppError> {
        Err(AppError::unavailable("connection refused"))
    }

    async fn list(&self, _offset: u64, _count: u32) -> Result<LinkPage, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Err(AppError::unavailable("connection refused"))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::unavailable("connection refused"))
    }
}

/// Store whose increments block until the test opens the gate.
pub struct GatedStore {
    inner: InMemoryLinkStore,
    gate: Arc<Semaphore>,
}

impl GatedStore {
    pub fn new() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(Self {
            inner: InMemoryLinkStore::new(),
            gate: gate.clone(),
        });
        (store, gate)
    }
}

#[async_trait]
impl LinkStore for GatedStore {
    async fn try_insert(&self, code: &str, target: &str) -> Result<InsertOutcome, AppError> {
        self.inner.try_insert(code, target).await
    }

    async fn get(&self, code: &str) -> Result<Option<Link>, AppError> {
        self.inner.get(code).await
    }

    async fn increment_access(&self, id: i64) -> Result<bool, AppError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| AppError::unavailable("gate closed"))?;
        permit.forget();
        self.inner.increment_access(id).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.inner.delete(id).await
    }

    async fn list(&self, offset: u64, count: u32) -> Result<LinkPage, AppError> {
        self.inner.list(offset, count).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}
