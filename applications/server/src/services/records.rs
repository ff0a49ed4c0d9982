/// Record service - user records with ban reconciliation before every read
use roster_core::{
    reconcile, BanState, Clock, RecordStore, Result, RosterError, Timestamp, UserId, UserRecord,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Clear expired bans, returning the instant used
    async fn reconcile(&self) -> Result<Timestamp> {
        let now = self.clock.now();
        let cleared = reconcile(self.store.as_ref(), now).await?;
        if cleared > 0 {
            tracing::debug!(cleared, "Reconciled expired bans");
        }
        Ok(now)
    }

    pub async fn list_all(&self) -> Result<Vec<UserRecord>> {
        self.reconcile().await?;
        self.store.get_all().await
    }

    pub async fn get_one(&self, id: UserId) -> Result<UserRecord> {
        self.reconcile().await?;
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| RosterError::not_found("User", id))
    }

    /// Users that are not banned. May be empty; presenting an empty list is
    /// the caller's decision.
    pub async fn list_non_banned(&self) -> Result<Vec<UserRecord>> {
        self.reconcile().await?;
        self.store.get_non_banned().await
    }

    pub async fn create(&self, name: &str) -> Result<UserRecord> {
        let now = self.reconcile().await?;
        let record = self.store.insert(name, now).await?;
        tracing::info!(user_id = record.user_id, user_name = %record.user_name, "Created user");
        Ok(record)
    }

    /// Ban a user. `until` of `None` is a permanent ban; otherwise it must be
    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
    pub async fn ban(&self, id: UserId, until: Option<&str>) -> Result<BanState> {
        self.reconcile().await?;

        let until = until.map(Timestamp::parse_ban_until).transpose()?;
        let ban = BanState::banned(until);

        self.store.set_ban_state(id, ban).await?;
        tracing::info!(
            user_id = id,
            banned_until = ?until.map(|t| t.to_string()),
            "Banned user"
        );
        Ok(ban)
    }
}
