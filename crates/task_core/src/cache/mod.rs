//! Server-state cache for the task collection.
//!
//! The collection is cached under a single key and is never patched
//! locally: every successful mutation invalidates it and the cache refetches
//! before the mutation returns. Concurrent loads share one in-flight request.

use crate::api::ApiClient;
use crate::error::AppError;
use crate::model::{Task, TaskInput};
use crate::notify::{Notice, Notifier};
use parking_lot::RwLock;
use std::sync::Arc;

/// One successful fetch of the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Increments with every successful fetch.
    pub version: u64,
    pub tasks: Arc<[Task]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionState {
    NotLoaded,
    Loaded(Snapshot),
    LoadFailed(String),
}

impl CollectionState {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            Self::Loaded(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: CollectionState,
    /// Bumped by every invalidation.
    generation: u64,
    /// Generation observed when the current state's fetch started.
    fetched_generation: u64,
    version: u64,
    fetches: u64,
}

impl Inner {
    fn invalidated(&self) -> bool {
        self.fetched_generation < self.generation
    }

    /// A failed load is not authoritative either, so the next load retries it.
    fn needs_fetch(&self) -> bool {
        matches!(
            self.state,
            CollectionState::NotLoaded | CollectionState::LoadFailed(_)
        ) || self.invalidated()
    }

    /// True when a fetch settled after `ticket` was taken and nothing
    /// invalidated the collection since; its outcome can be shared.
    fn settled_since(&self, ticket: u64) -> bool {
        self.fetches != ticket && !self.invalidated()
    }
}

pub struct TaskCache {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    inner: RwLock<Inner>,
    fetch_lock: tokio::sync::Mutex<()>,
}

impl TaskCache {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            inner: RwLock::new(Inner {
                state: CollectionState::NotLoaded,
                generation: 0,
                fetched_generation: 0,
                version: 0,
                fetches: 0,
            }),
            fetch_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> CollectionState {
        self.inner.read().state.clone()
    }

    /// True when the cached collection is no longer authoritative.
    pub fn is_stale(&self) -> bool {
        self.inner.read().needs_fetch()
    }

    pub fn invalidate(&self) {
        let mut inner = self.inner.write();
        inner.generation += 1;
        tracing::debug!(generation = inner.generation, "task collection invalidated");
    }

    /// Looks a task up in the last loaded collection.
    pub fn find_task(&self, id: &str) -> Option<Task> {
        let inner = self.inner.read();
        inner
            .state
            .snapshot()
            .and_then(|snapshot| snapshot.tasks.iter().find(|task| task.id == id).cloned())
    }

    /// Fetches the collection if it was never loaded or has been invalidated.
    pub async fn ensure_loaded(&self) -> CollectionState {
        let ticket = self.inner.read().fetches;
        let _guard = self.fetch_lock.lock().await;
        {
            let inner = self.inner.read();
            if !inner.needs_fetch() || inner.settled_since(ticket) {
                return inner.state.clone();
            }
        }
        self.fetch().await
    }

    /// Fetches the collection unconditionally, unless another fetch settled
    /// while this call was waiting for its turn.
    pub async fn refresh(&self) -> CollectionState {
        let ticket = self.inner.read().fetches;
        let _guard = self.fetch_lock.lock().await;
        {
            let inner = self.inner.read();
            if inner.settled_since(ticket) {
                return inner.state.clone();
            }
        }
        self.fetch().await
    }

    pub async fn create_task(&self, input: &TaskInput) -> Result<Task, AppError> {
        let result = self.api.create_task(input).await;
        self.settle(result, "create", "Task created successfully!").await
    }

    pub async fn update_task(&self, id: &str, input: &TaskInput) -> Result<Task, AppError> {
        let result = self.api.update_task(id, input).await;
        self.settle(result, "update", "Task updated successfully!").await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let result = self.api.delete_task(id).await;
        self.settle(result, "delete", "Task deleted successfully!").await
    }

    // Caller must hold `fetch_lock`.
    async fn fetch(&self) -> CollectionState {
        let generation = self.inner.read().generation;
        let result = self.api.list_tasks().await;

        let mut inner = self.inner.write();
        inner.fetches += 1;
        inner.fetched_generation = inner.fetched_generation.max(generation);
        match result {
            Ok(tasks) => {
                let version = inner.version + 1;
                tracing::info!(count = tasks.len(), version, "task collection loaded");
                inner.version = version;
                inner.state = CollectionState::Loaded(Snapshot {
                    version,
                    tasks: tasks.into(),
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "task collection failed to load");
                inner.state = CollectionState::LoadFailed(err.message().to_string());
            }
        }
        inner.state.clone()
    }

    async fn settle<T>(
        &self,
        result: Result<T, AppError>,
        verb: &str,
        success_message: &str,
    ) -> Result<T, AppError> {
        match result {
            Ok(value) => {
                tracing::info!(action = verb, "mutation succeeded");
                self.invalidate();
                self.emit(Notice::success(success_message));
                self.ensure_loaded().await;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!(action = verb, error = %err, "mutation failed");
                self.emit(Notice::failure(format!(
                    "Failed to {verb} task: {}",
                    err.message()
                )));
                Err(err)
            }
        }
    }

    fn emit(&self, notice: Notice) {
        if let Err(err) = self.notifier.notify(&notice) {
            tracing::warn!(error = %err, "notification could not be shown");
        }
    }
}
