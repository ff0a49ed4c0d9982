use crate::users;
use async_trait::async_trait;
use roster_core::{
    error::Result,
    storage::RecordStore,
    types::{BanState, Timestamp, UserId, UserRecord},
};
use sqlx::SqlitePool;

/// Record store backed by a `SQLite` pool.
///
/// Each call checks a connection out of the pool for the duration of one
/// statement; the pool reclaims it on every exit path.
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_all(&self) -> Result<Vec<UserRecord>> {
        users::get_all(&self.pool).await
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<UserRecord>> {
        users::get_by_id(&self.pool, id).await
    }

    async fn get_non_banned(&self) -> Result<Vec<UserRecord>> {
        users::get_non_banned(&self.pool).await
    }

    async fn insert(&self, name: &str, created_at: Timestamp) -> Result<UserRecord> {
        users::create(&self.pool, name, created_at).await
    }

    async fn set_ban_state(&self, id: UserId, ban: BanState) -> Result<()> {
        users::set_ban_state(&self.pool, id, ban).await
    }

    async fn clear_expired_ban(&self, id: UserId, until: Timestamp) -> Result<bool> {
        users::clear_expired_ban(&self.pool, id, until).await
    }
}
