/// Server services
pub mod records;
pub mod source_sync;
pub mod webhook;

pub use records::RecordService;
pub use source_sync::{GitSync, PullOutcome, SourceSync};
pub use webhook::{WebhookOutcome, WebhookService, WebhookVerifier};
