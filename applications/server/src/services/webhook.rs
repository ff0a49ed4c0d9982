/// Deployment webhook - request verification and the trusted sync action
use crate::services::source_sync::{PullOutcome, SourceSync};
use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use roster_core::{Result, RosterError};
use serde_json::Value;
use sha1::Sha1;
use sha2::{Sha256, Sha512};
use std::fmt;
use std::sync::Arc;

pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";
pub const SIGNATURE_HEADER: &str = "x-hub-signature";
const USER_AGENT_HEADER: &str = "user-agent";

/// Why a delivery was not trusted. Only ever logged server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingHeader(&'static str),
    UnexpectedUserAgent,
    NotJson,
    MalformedSignature,
    UnsupportedAlgorithm(String),
    SignatureMismatch,
    MissingRef,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::MissingHeader(name) => write!(f, "missing header {name}"),
            Rejection::UnexpectedUserAgent => write!(f, "unexpected user agent"),
            Rejection::NotJson => write!(f, "body is not a JSON object"),
            Rejection::MalformedSignature => write!(f, "malformed signature header"),
            Rejection::UnsupportedAlgorithm(algo) => {
                write!(f, "unsupported signature algorithm {algo:?}")
            }
            Rejection::SignatureMismatch => write!(f, "signature mismatch"),
            Rejection::MissingRef => write!(f, "push payload has no ref"),
        }
    }
}

impl From<Rejection> for RosterError {
    fn from(rejection: Rejection) -> Self {
        RosterError::authentication(rejection.to_string())
    }
}

/// A delivery that passed every check
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: String,
    pub delivery_id: String,
    pub payload: Value,
}

/// Ordered trust checks for an inbound delivery
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Vec<u8>,
    user_agent_prefix: String,
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("user_agent_prefix", &self.user_agent_prefix)
            .finish()
    }
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<Vec<u8>>, user_agent_prefix: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            user_agent_prefix: user_agent_prefix.into(),
        }
    }

    /// Run the checks in order, stopping at the first failure.
    ///
    /// Header presence and the body shape are settled before any HMAC is
    /// computed.
    pub fn verify(
        &self,
        headers: &HeaderMap,
        body: &[u8],
    ) -> std::result::Result<Delivery, Rejection> {
        let event = required_header(headers, EVENT_HEADER)?;
        let delivery_id = required_header(headers, DELIVERY_HEADER)?;
        let signature = required_header(headers, SIGNATURE_HEADER)?;
        let user_agent = required_header(headers, USER_AGENT_HEADER)?;

        if !user_agent.starts_with(&self.user_agent_prefix) {
            return Err(Rejection::UnexpectedUserAgent);
        }

        if !is_json_content_type(headers) {
            return Err(Rejection::NotJson);
        }
        let payload: Value = serde_json::from_slice(body).map_err(|_| Rejection::NotJson)?;
        if !payload.is_object() {
            return Err(Rejection::NotJson);
        }

        verify_signature(signature, body, &self.secret)?;

        Ok(Delivery {
            event: event.to_string(),
            delivery_id: delivery_id.to_string(),
            payload,
        })
    }
}

fn required_header<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> std::result::Result<&'a str, Rejection> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(Rejection::MissingHeader(name))
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Check a `<algorithm>=<hexdigest>` signature over `body`.
///
/// The digest comparison is constant-time.
pub fn verify_signature(
    header: &str,
    body: &[u8],
    secret: &[u8],
) -> std::result::Result<(), Rejection> {
    let (algorithm, digest) = header
        .split_once('=')
        .ok_or(Rejection::MalformedSignature)?;

    let expected = hex::decode(digest.trim()).map_err(|_| Rejection::SignatureMismatch)?;

    let matches = match algorithm.trim().to_ascii_lowercase().as_str() {
        "sha1" => check::<Hmac<Sha1>>(secret, body, &expected),
        "sha256" => check::<Hmac<Sha256>>(secret, body, &expected),
        "sha512" => check::<Hmac<Sha512>>(secret, body, &expected),
        other => return Err(Rejection::UnsupportedAlgorithm(other.to_string())),
    };

    if matches {
        Ok(())
    } else {
        Err(Rejection::SignatureMismatch)
    }
}

fn check<M: Mac + hmac::digest::KeyInit>(secret: &[u8], body: &[u8], expected: &[u8]) -> bool {
    let Ok(mut mac) = <M as hmac::digest::KeyInit>::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(expected).is_ok()
}

/// Hex HMAC of `body`, in the form carried by the signature header
pub fn sign(algorithm: &str, secret: &[u8], body: &[u8]) -> Option<String> {
    fn digest<M: Mac + hmac::digest::KeyInit>(secret: &[u8], body: &[u8]) -> Option<String> {
        let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(secret).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    let hex = match algorithm {
        "sha1" => digest::<Hmac<Sha1>>(secret, body)?,
        "sha256" => digest::<Hmac<Sha256>>(secret, body)?,
        "sha512" => digest::<Hmac<Sha512>>(secret, body)?,
        _ => return None,
    };
    Some(format!("{algorithm}={hex}"))
}

/// Result of a trusted delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Pong,
    IgnoredEvent(String),
    IgnoredBranch(String),
    NothingToDo,
    Updated { revision: String },
}

impl WebhookOutcome {
    pub fn message(&self) -> String {
        match self {
            WebhookOutcome::Pong => "Hi!".to_string(),
            WebhookOutcome::IgnoredEvent(_) => "Wrong event type".to_string(),
            WebhookOutcome::IgnoredBranch(_) => "Not the deployment branch; ignoring".to_string(),
            WebhookOutcome::NothingToDo => "Didn't pull any information from remote!".to_string(),
            WebhookOutcome::Updated { revision } => {
                format!("Updated server to commit {revision}")
            }
        }
    }
}

pub struct WebhookService {
    verifier: WebhookVerifier,
    branch_ref: String,
    sync: Arc<dyn SourceSync>,
}

impl WebhookService {
    pub fn new(verifier: WebhookVerifier, branch_ref: String, sync: Arc<dyn SourceSync>) -> Self {
        Self {
            verifier,
            branch_ref,
            sync,
        }
    }

    /// Verify a delivery and, for a push to the deployment branch, pull.
    ///
    /// Any failed check is `RosterError::Authentication`.
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Result<WebhookOutcome> {
        let delivery = self.verifier.verify(headers, body)?;

        tracing::info!(
            event = %delivery.event,
            delivery = %delivery.delivery_id,
            "Webhook delivery verified"
        );

        match delivery.event.as_str() {
            "ping" => return Ok(WebhookOutcome::Pong),
            "push" => {}
            other => return Ok(WebhookOutcome::IgnoredEvent(other.to_string())),
        }

        let git_ref = delivery
            .payload
            .get("ref")
            .and_then(Value::as_str)
            .ok_or(Rejection::MissingRef)?;

        if git_ref != self.branch_ref {
            tracing::info!(git_ref, "Push is not for the deployment branch");
            return Ok(WebhookOutcome::IgnoredBranch(git_ref.to_string()));
        }

        match self.sync.pull().await? {
            PullOutcome::Updated { revision } => Ok(WebhookOutcome::Updated { revision }),
            PullOutcome::Unchanged => Ok(WebhookOutcome::NothingToDo),
            PullOutcome::Failed(reason) => {
                tracing::warn!("Pull reported failure: {}", reason);
                Ok(WebhookOutcome::NothingToDo)
            }
        }
    }
}
