//! User record queries

use roster_core::{
    error::Result,
    types::{BanState, Timestamp, UserId, UserRecord},
    RosterError,
};
use sqlx::{SqliteExecutor, SqlitePool};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    user_name: String,
    created_at: String,
    is_banned: bool,
    banned_until: Option<String>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RosterError;

    fn try_from(row: UserRow) -> Result<Self> {
        let created_at = Timestamp::parse(&row.created_at)
            .map_err(|_| RosterError::storage(format!("Invalid created_at for user {}", row.user_id)))?;
        let banned_until = row
            .banned_until
            .as_deref()
            .map(Timestamp::parse)
            .transpose()
            .map_err(|_| {
                RosterError::storage(format!("Invalid banned_until for user {}", row.user_id))
            })?;

        Ok(UserRecord {
            user_id: row.user_id,
            user_name: row.user_name,
            created_at,
            ban: BanState::from_columns(row.is_banned, banned_until),
        })
    }
}

fn into_records(rows: Vec<UserRow>) -> Result<Vec<UserRecord>> {
    rows.into_iter().map(UserRecord::try_from).collect()
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<UserRecord>> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, user_name, created_at, is_banned, banned_until
         FROM users
         ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

pub async fn get_by_id(pool: &SqlitePool, id: UserId) -> Result<Option<UserRecord>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, user_name, created_at, is_banned, banned_until
         FROM users
         WHERE user_id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(UserRecord::try_from).transpose()
}

pub async fn get_non_banned(pool: &SqlitePool) -> Result<Vec<UserRecord>> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, user_name, created_at, is_banned, banned_until
         FROM users
         WHERE is_banned = 0
         ORDER BY user_id",
    )
    .fetch_all(pool)
    .await?;

    into_records(rows)
}

/// Create an unbanned user. The ID comes from SQLite's rowid.
pub async fn create(pool: &SqlitePool, name: &str, created_at: Timestamp) -> Result<UserRecord> {
    let result = sqlx::query(
        "INSERT INTO users (user_name, created_at, is_banned, banned_until)
         VALUES (?, ?, 0, NULL)",
    )
    .bind(name)
    .bind(created_at.to_string())
    .execute(pool)
    .await
    .map_err(|e| match RosterError::from(e) {
        RosterError::Conflict(_) => RosterError::conflict(format!("user name {name:?} is taken")),
        other => other,
    })?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| RosterError::storage("Failed to retrieve created user"))
}

/// Insert a complete record, keeping its ID. Used when seeding.
pub async fn import<'e>(executor: impl SqliteExecutor<'e>, record: &UserRecord) -> Result<()> {
    sqlx::query(
        "INSERT INTO users (user_id, user_name, created_at, is_banned, banned_until)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(record.user_id)
    .bind(&record.user_name)
    .bind(record.created_at.to_string())
    .bind(record.is_banned())
    .bind(record.banned_until().map(|t| t.to_string()))
    .execute(executor)
    .await?;

    Ok(())
}

/// Overwrite the ban columns of one user
pub async fn set_ban_state(pool: &SqlitePool, id: UserId, ban: BanState) -> Result<()> {
    let result = sqlx::query(
        "UPDATE users
         SET is_banned = ?, banned_until = ?
         WHERE user_id = ?",
    )
    .bind(ban.is_banned())
    .bind(ban.banned_until().map(|t| t.to_string()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RosterError::not_found("User", id));
    }

    Ok(())
}

/// Unban `id` only if it is still banned until exactly `until`.
///
/// Returns whether a row changed.
pub async fn clear_expired_ban(pool: &SqlitePool, id: UserId, until: Timestamp) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE users
         SET is_banned = 0, banned_until = NULL
         WHERE user_id = ? AND is_banned = 1 AND banned_until = ?",
    )
    .bind(id)
    .bind(until.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
