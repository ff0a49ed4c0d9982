/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use roster_core::RosterError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Webhook rejections arrive here as `RosterError::Authentication`
    #[error("Domain error: {0}")]
    Domain(#[from] RosterError),
}

/// Fixed status for every webhook rejection
pub const WEBHOOK_REJECT_STATUS: StatusCode = StatusCode::IM_A_TEAPOT;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Domain(ref e) => match e {
                RosterError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
                RosterError::Conflict(_) | RosterError::MalformedInput(_) => {
                    (StatusCode::BAD_REQUEST, e.to_string())
                }
                RosterError::Authentication(reason) => {
                    tracing::warn!("Webhook rejected: {}", reason);
                    return WEBHOOK_REJECT_STATUS.into_response();
                }
                other => {
                    tracing::error!("Domain error: {:?}", other);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
