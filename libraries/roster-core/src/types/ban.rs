//! Ban lifecycle
//!
//! ```text
//! Unbanned --ban(None)--> Permanent
//! Unbanned --ban(T)-----> Until(T)
//! Until(T) --reconcile(now), T < now--> Unbanned
//! Until(T) / Permanent --ban(..)--> overwritten
//! ```
//!
//! `Permanent` has no automatic outgoing transition.

use super::Timestamp;
use serde::{Deserialize, Serialize};

/// Ban state of a single record.
///
/// On the wire and in storage this is the pair `is_banned` / `banned_until`;
/// the enum makes "unbanned with an expiry" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BanColumns", into = "BanColumns")]
pub enum BanState {
    #[default]
    Unbanned,
    /// Banned with no expiry
    Permanent,
    /// Banned until the given instant
    Until(Timestamp),
}

impl BanState {
    /// Build from the stored column pair.
    ///
    /// `banned_until` is discarded when `is_banned` is false.
    pub fn from_columns(is_banned: bool, banned_until: Option<Timestamp>) -> Self {
        match (is_banned, banned_until) {
            (false, _) => Self::Unbanned,
            (true, None) => Self::Permanent,
            (true, Some(until)) => Self::Until(until),
        }
    }

    /// Ban state requested by a ban call; `None` means permanent
    pub fn banned(until: Option<Timestamp>) -> Self {
        Self::from_columns(true, until)
    }

    pub fn is_banned(&self) -> bool {
        !matches!(self, Self::Unbanned)
    }

    pub fn banned_until(&self) -> Option<Timestamp> {
        match self {
            Self::Until(until) => Some(*until),
            Self::Unbanned | Self::Permanent => None,
        }
    }

    /// A temporary ban whose expiry lies strictly before `now`
    pub fn is_expired(&self, now: Timestamp) -> bool {
        matches!(self, Self::Until(until) if *until < now)
    }

    /// State after reconciliation at `now`
    #[must_use]
    pub fn reconciled(self, now: Timestamp) -> Self {
        if self.is_expired(now) {
            Self::Unbanned
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct BanColumns {
    is_banned: bool,
    #[serde(default)]
    banned_until: Option<Timestamp>,
}

impl From<BanColumns> for BanState {
    fn from(columns: BanColumns) -> Self {
        Self::from_columns(columns.is_banned, columns.banned_until)
    }
}

impl From<BanState> for BanColumns {
    fn from(state: BanState) -> Self {
        Self {
            is_banned: state.is_banned(),
            banned_until: state.banned_until(),
        }
    }
}
