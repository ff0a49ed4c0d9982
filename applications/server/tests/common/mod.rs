//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use roster_core::{FixedClock, Timestamp};
use roster_server::{
    create_router,
    services::{
        webhook::{sign, DELIVERY_HEADER, EVENT_HEADER, SIGNATURE_HEADER},
        PullOutcome, RecordService, SourceSync, WebhookService, WebhookVerifier,
    },
    state::AppState,
};
use roster_storage::SqliteRecordStore;
use sqlx::SqlitePool;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tempfile::TempDir;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const DEPLOY_REF: &str = "refs/heads/master";
pub const NOW: &str = "2025-01-01T00:00:00.000Z";

/// `SourceSync` that records calls and replays a canned outcome
pub struct RecordingSync {
    calls: AtomicUsize,
    outcome: Mutex<PullOutcome>,
}

impl RecordingSync {
    pub fn new(outcome: PullOutcome) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Mutex::new(outcome),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceSync for RecordingSync {
    async fn pull(&self) -> roster_core::Result<PullOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome.lock().unwrap().clone())
    }
}

/// Router wired to a temporary database, a fixed clock, and a recording sync
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub clock: Arc<FixedClock>,
    pub sync: Arc<RecordingSync>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_outcome(PullOutcome::Updated {
            revision: "0d1a26e67d8f5eaf1f6ba5c57fc3c7d91ac0fd1c".to_string(),
        })
        .await
    }

    pub async fn with_outcome(outcome: PullOutcome) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

        let pool = roster_storage::create_pool(&db_url).await.unwrap();
        roster_storage::run_migrations(&pool).await.unwrap();

        let clock = Arc::new(FixedClock::new(Timestamp::parse(NOW).unwrap()));
        let sync = Arc::new(RecordingSync::new(outcome));

        let records = RecordService::new(
            Arc::new(SqliteRecordStore::new(pool.clone())),
            clock.clone(),
        );
        let webhook = WebhookService::new(
            WebhookVerifier::new(WEBHOOK_SECRET, "GitHub-Hookshot/"),
            DEPLOY_REF.to_string(),
            sync.clone(),
        );

        let router = create_router(AppState::new(Arc::new(records), Arc::new(webhook)));

        Self {
            router,
            pool,
            clock,
            sync,
            _temp_dir: temp_dir,
        }
    }
}

/// A webhook request carrying every header a genuine delivery has
pub fn webhook_request(event: &str, body: &str) -> axum::http::request::Builder {
    let signature = sign("sha256", WEBHOOK_SECRET.as_bytes(), body.as_bytes()).unwrap();

    Request::builder()
        .uri("/update_server")
        .method("POST")
        .header(EVENT_HEADER, event)
        .header(DELIVERY_HEADER, "72d3162e-cc78-11e3-81ab-4c9367dc0958")
        .header(SIGNATURE_HEADER, signature)
        .header(header::USER_AGENT, "GitHub-Hookshot/044aadd")
        .header(header::CONTENT_TYPE, "application/json")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
