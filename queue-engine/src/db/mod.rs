//! Store Module
//!
//! The engine does not own persistence. It talks to records through the
//! [`WaitlistStore`] trait (simple CRUD per entity); [`MemoryStore`] is the
//! in-process implementation used by the binary and the tests.

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use shared::{EntryPatch, Restaurant, TableType, WaitStatus, WaitlistEntry};
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Another non-terminal entry already carries this code
    #[error("Confirmation code already in use: {0}")]
    DuplicateConfirmationCode(String),

    /// Optimistic version check failed
    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("Database error: {0}")]
    Database(String),
}

impl std::fmt::Debug for dyn WaitlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WaitlistStore")
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence collaborator consumed by the engine
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    async fn get_restaurant(&self, restaurant_id: &str) -> StoreResult<Option<Restaurant>>;

    /// Every restaurant the store knows about (expiry sweeps)
    async fn list_restaurant_ids(&self) -> StoreResult<Vec<String>>;

    async fn update_restaurant_wait_status(
        &self,
        restaurant_id: &str,
        status: WaitStatus,
        custom_wait_time: u32,
    ) -> StoreResult<()>;

    async fn get_table_types(&self, restaurant_id: &str) -> StoreResult<Vec<TableType>>;

    /// Active entries of a restaurant, ordered by `queue_position`
    async fn get_active_entries(&self, restaurant_id: &str) -> StoreResult<Vec<WaitlistEntry>>;

    /// Seated entries with `seated_at >= since`
    async fn get_seated_entries(
        &self,
        restaurant_id: &str,
        since: i64,
    ) -> StoreResult<Vec<WaitlistEntry>>;

    async fn get_entry(&self, entry_id: &str) -> StoreResult<Option<WaitlistEntry>>;

    /// Prefers the non-terminal holder of the code
    async fn get_entry_by_confirmation_code(
        &self,
        code: &str,
    ) -> StoreResult<Option<WaitlistEntry>>;

    async fn insert_entry(&self, entry: WaitlistEntry) -> StoreResult<WaitlistEntry>;

    /// Apply `patch` if the stored version still equals `expected_version`
    async fn update_entry(
        &self,
        entry_id: &str,
        patch: EntryPatch,
        expected_version: u64,
    ) -> StoreResult<WaitlistEntry>;
}
