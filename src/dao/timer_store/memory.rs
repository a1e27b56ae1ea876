//! Process-local timer store used in development and tests.

use std::{sync::Arc, time::SystemTime};

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{models::TimerEntity, storage::StorageResult, timer_store::TimerStore};

/// Timer store keeping every record in a concurrent map.
///
/// Records are cloned in and out, so callers never share a live aggregate.
#[derive(Clone, Default)]
pub struct MemoryTimerStore {
    timers: Arc<DashMap<Uuid, TimerEntity>>,
}

impl MemoryTimerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TimerStore for MemoryTimerStore {
    fn find_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TimerEntity>>> {
        let found = self.timers.get(&id).map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn list_timers_by_owner(
        &self,
        owner_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<TimerEntity>>> {
        let mut timers = self
            .timers
            .iter()
            .filter(|entry| entry.value().owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| timer.created_at);
        Box::pin(async move { Ok(timers) })
    }

    fn save_timer(&self, timer: TimerEntity) -> BoxFuture<'static, StorageResult<TimerEntity>> {
        let previous = self.timers.get(&timer.id).map(|entry| entry.value().clone());
        let stored = timer.stamped(previous.as_ref(), SystemTime::now());
        self.timers.insert(stored.id, stored.clone());
        Box::pin(async move { Ok(stored) })
    }

    fn delete_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let removed = self.timers.remove(&id).is_some();
        Box::pin(async move { Ok(removed) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
