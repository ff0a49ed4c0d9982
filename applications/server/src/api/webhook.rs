/// Deployment webhook route
use crate::{error::Result, state::AppState};
use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::services::WebhookOutcome;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// POST /update_server
///
/// Every rejection is the same bodiless 418; the reason is only logged.
pub async fn update_server(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    let outcome = app_state.webhook.handle(&headers, &body).await?;

    let commit = match &outcome {
        WebhookOutcome::Updated { revision } => Some(revision.clone()),
        _ => None,
    };

    Ok(Json(WebhookResponse {
        msg: outcome.message(),
        commit,
    }))
}
