//! Roster Server Library
//!
//! User record service with ban reconciliation and a signed deployment webhook.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{GitSync, RecordService, WebhookService, WebhookVerifier};
pub use state::AppState;
