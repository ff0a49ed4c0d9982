//! Storage trait for user records

use crate::error::Result;
use crate::types::{BanState, Timestamp, UserId, UserRecord};
use async_trait::async_trait;

/// Access to the single table of user records.
///
/// Implementations acquire whatever connection they need per call and
/// release it before returning, on every path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records; no ordering is promised
    async fn get_all(&self) -> Result<Vec<UserRecord>>;

    /// Record by ID
    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Records that are not banned
    async fn get_non_banned(&self) -> Result<Vec<UserRecord>>;

    /// Create an unbanned record; the store assigns the ID.
    ///
    /// Fails with `Conflict` if `name` is taken.
    async fn insert(&self, name: &str, created_at: Timestamp) -> Result<UserRecord>;

    /// Overwrite the ban columns of one record.
    ///
    /// Fails with `NotFound` if no row matched.
    async fn set_ban_state(&self, id: UserId, ban: BanState) -> Result<()>;

    /// Unban one record, but only while its ban still ends at `until`.
    ///
    /// Returns `false` when the row no longer holds that exact ban, so a
    /// re-ban that landed after the caller read the record is left alone.
    async fn clear_expired_ban(&self, id: UserId, until: Timestamp) -> Result<bool>;
}
