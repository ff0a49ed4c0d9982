//! Roster Core
//!
//! Storage-agnostic types, traits, and error handling for Roster.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `UserRecord`, `BanState`, `Timestamp`
//! - **Core Traits**: `RecordStore`, `Clock`
//! - **Ban Reconciler**: `reconcile`, clearing expired temporary bans
//! - **Error Handling**: Unified `RosterError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use roster_core::types::{BanState, Timestamp};
//!
//! let until = Timestamp::parse_ban_until("2020-01-01").unwrap();
//! let ban = BanState::banned(Some(until));
//!
//! let now = Timestamp::parse("2025-01-01T00:00:00.000Z").unwrap();
//! assert!(ban.is_expired(now));
//! assert_eq!(ban.reconciled(now), BanState::Unbanned);
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod reconcile;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, RosterError};
pub use reconcile::reconcile;
pub use storage::RecordStore;
pub use types::{BanState, Timestamp, UserId, UserRecord};
