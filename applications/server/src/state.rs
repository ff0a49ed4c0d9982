/// Shared application state
use crate::services::{RecordService, WebhookService};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordService>,
    pub webhook: Arc<WebhookService>,
}

impl AppState {
    pub fn new(records: Arc<RecordService>, webhook: Arc<WebhookService>) -> Self {
        Self { records, webhook }
    }
}
