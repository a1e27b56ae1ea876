/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend.
pub mod memory;

use crate::dao::models::TimerEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the key-value persistence layer holding timer aggregates.
///
/// Saves are plain overwrites of the whole record: two requests that load the
/// same timer and save it back race, and the last writer wins.
pub trait TimerStore: Send + Sync {
    /// Fetch a timer by its primary key.
    fn find_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TimerEntity>>>;
    /// Fetch every timer owned by `owner_id`, oldest first.
    fn list_timers_by_owner(
        &self,
        owner_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<TimerEntity>>>;
    /// Upsert a timer, stamping `created_at`/`updated_at`, and return the stored record.
    fn save_timer(&self, timer: TimerEntity) -> BoxFuture<'static, StorageResult<TimerEntity>>;
    /// Delete a timer, returning whether a record existed.
    fn delete_timer(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap round-trip proving the backend is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
