//! Ban reconciliation
//!
//! Clears temporary bans whose expiry has passed. Runs synchronously before
//! every read so callers never observe a stale ban.

use crate::error::Result;
use crate::storage::RecordStore;
use crate::types::Timestamp;

/// Unban every record whose temporary ban expired strictly before `now`.
///
/// Permanent bans are skipped. Each write is conditional on the expiry that
/// was read, so a ban replaced in the meantime survives. Returns the number
/// of records updated; a second call with the same `now` returns 0.
pub async fn reconcile<S>(store: &S, now: Timestamp) -> Result<usize>
where
    S: RecordStore + ?Sized,
{
    let records = store.get_all().await?;

    let mut updated = 0;
    for record in records.iter().filter(|r| r.ban.is_expired(now)) {
        let Some(until) = record.banned_until() else {
            continue;
        };

        if store.clear_expired_ban(record.user_id, until).await? {
            tracing::info!(
                user_id = record.user_id,
                banned_until = %until,
                "Unbanning user, ban expired"
            );
            updated += 1;
        } else {
            tracing::debug!(user_id = record.user_id, "Ban changed since read, skipping");
        }
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockRecordStore;
    use crate::types::{BanState, UserRecord};
    use crate::RosterError;
    use mockall::predicate::eq;

    fn ts(raw: &str) -> Timestamp {
        Timestamp::parse(raw).unwrap()
    }

    fn record(user_id: i64, ban: BanState) -> UserRecord {
        UserRecord {
            user_id,
            user_name: format!("user{user_id}"),
            created_at: ts("2019-06-01T00:00:00.000Z"),
            ban,
        }
    }

    #[tokio::test]
    async fn test_unbans_only_expired_temporary_bans() {
        let now = ts("2025-01-01T00:00:00.000Z");
        let records = vec![
            record(1, BanState::Unbanned),
            record(2, BanState::Permanent),
            record(3, BanState::Until(ts("2020-01-01T00:00:00.000Z"))),
            record(4, BanState::Until(ts("2030-01-01T00:00:00.000Z"))),
            record(5, BanState::Until(ts("2024-12-31T23:59:59.999Z"))),
        ];

        let mut store = MockRecordStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(move || Ok(records.clone()));
        store
            .expect_clear_expired_ban()
            .with(eq(3), eq(ts("2020-01-01T00:00:00.000Z")))
            .times(1)
            .returning(|_, _| Ok(true));
        store
            .expect_clear_expired_ban()
            .with(eq(5), eq(ts("2024-12-31T23:59:59.999Z")))
            .times(1)
            .returning(|_, _| Ok(true));
        store.expect_set_ban_state().never();

        let updated = reconcile(&store, now).await.unwrap();
        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_ban_ending_exactly_now_is_kept() {
        let now = ts("2025-01-01T00:00:00.000Z");

        let mut store = MockRecordStore::new();
        store
            .expect_get_all()
            .returning(move || Ok(vec![record(1, BanState::Until(now))]));
        store.expect_clear_expired_ban().never();

        assert_eq!(reconcile(&store, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockRecordStore::new();
        store
            .expect_get_all()
            .returning(|| Err(RosterError::storage("database is locked")));
        store.expect_clear_expired_ban().never();

        let err = reconcile(&store, Timestamp::now()).await.unwrap_err();
        assert!(matches!(err, RosterError::Storage(_)));
    }

    #[tokio::test]
    async fn test_ban_replaced_after_read_is_not_counted() {
        let now = ts("2025-01-01T00:00:00.000Z");

        let mut store = MockRecordStore::new();
        store.expect_get_all().returning(|| {
            Ok(vec![record(
                1,
                BanState::Until(ts("2020-01-01T00:00:00.000Z")),
            )])
        });
        store
            .expect_clear_expired_ban()
            .times(1)
            .returning(|_, _| Ok(false));
        store.expect_set_ban_state().never();

        assert_eq!(reconcile(&store, now).await.unwrap(), 0);
    }
}
