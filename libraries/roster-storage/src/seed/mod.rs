//! Static dataset import
//!
//! The dataset is a JSON array of rows shaped like the API's records:
//!
//! ```json
//! [{"user_id": 1, "user_name": "alice", "created_at": "2019-06-01T00:00:00.000Z",
//!   "is_banned": 0, "banned_until": null}]
//! ```
//!
//! `is_banned` may be a boolean or `0`/`1`. An unbanned row's `banned_until`
//! is dropped on import.

use crate::users;
use roster_core::{
    error::Result,
    types::{BanState, Timestamp, UserId, UserRecord},
    RosterError,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SeedRow {
    user_id: UserId,
    user_name: String,
    created_at: Timestamp,
    is_banned: BanFlag,
    #[serde(default)]
    banned_until: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BanFlag {
    Bool(bool),
    Int(i64),
}

impl BanFlag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(flag) => *flag,
            Self::Int(flag) => *flag != 0,
        }
    }
}

impl From<SeedRow> for UserRecord {
    fn from(row: SeedRow) -> Self {
        UserRecord {
            user_id: row.user_id,
            user_name: row.user_name,
            created_at: row.created_at,
            ban: BanState::from_columns(row.is_banned.is_set(), row.banned_until),
        }
    }
}

/// Parse a dataset from JSON bytes
pub fn parse_dataset(bytes: &[u8]) -> Result<Vec<UserRecord>> {
    let rows: Vec<SeedRow> = serde_json::from_slice(bytes)?;
    Ok(rows.into_iter().map(UserRecord::from).collect())
}

/// Import `records` if the table is empty.
///
/// Returns the number of rows written; 0 when the table already held data.
/// The import is all-or-nothing.
pub async fn seed_records(pool: &SqlitePool, records: &[UserRecord]) -> Result<usize> {
    let existing = users::count(pool).await?;
    if existing > 0 {
        tracing::info!(existing, "Users table already populated, skipping seed");
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for record in records {
        users::import(&mut *tx, record).await?;
    }
    tx.commit().await?;

    tracing::info!(count = records.len(), "Seeded users table");
    Ok(records.len())
}

/// Read a dataset file and import it if the table is empty
pub async fn seed_from_file(pool: &SqlitePool, path: &Path) -> Result<usize> {
    tracing::info!(path = %path.display(), "Seeding users table from dataset");

    let bytes = tokio::fs::read(path).await.map_err(|e| {
        RosterError::storage(format!("Failed to read dataset {}: {e}", path.display()))
    })?;
    let records = parse_dataset(&bytes)?;

    seed_records(pool, &records).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_integer_and_bool_flags() {
        let records = parse_dataset(
            br#"[
                {"user_id": 1, "user_name": "a", "created_at": "2019-06-01T00:00:00.000Z",
                 "is_banned": 0, "banned_until": null},
                {"user_id": 2, "user_name": "b", "created_at": "2019-06-02T00:00:00.000Z",
                 "is_banned": true},
                {"user_id": 3, "user_name": "c", "created_at": "2019-06-03T00:00:00.000Z",
                 "is_banned": 1, "banned_until": "2030-01-01T00:00:00.000Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(records[0].ban, BanState::Unbanned);
        assert_eq!(records[1].ban, BanState::Permanent);
        assert_eq!(
            records[2].ban,
            BanState::Until(Timestamp::parse("2030-01-01T00:00:00.000Z").unwrap())
        );
    }

    #[test]
    fn test_parse_drops_expiry_of_unbanned_rows() {
        let records = parse_dataset(
            br#"[{"user_id": 1, "user_name": "a", "created_at": "2019-06-01T00:00:00.000Z",
                  "is_banned": false, "banned_until": "2030-01-01T00:00:00.000Z"}]"#,
        )
        .unwrap();

        assert_eq!(records[0].banned_until(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_dataset(b"{not json").is_err());
    }
}
