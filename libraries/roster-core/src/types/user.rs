/// User record domain type
use super::{BanState, Timestamp};
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// A user record as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Store-assigned identifier
    pub user_id: UserId,

    /// Unique, immutable display name
    pub user_name: String,

    /// Creation time, immutable
    pub created_at: Timestamp,

    /// `is_banned` / `banned_until` on the wire
    #[serde(flatten)]
    pub ban: BanState,
}

impl UserRecord {
    pub fn is_banned(&self) -> bool {
        self.ban.is_banned()
    }

    pub fn banned_until(&self) -> Option<Timestamp> {
        self.ban.banned_until()
    }
}
