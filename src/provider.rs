//! Shared plumbing for the external HTTP collaborators.
//!
//! Both the inference endpoint and the drug-label registry are reached
//! through a `reqwest::Client` built here, and both classify their failures
//! with [`ProviderError`]. Whether a failure is worth retrying is decided by
//! [`ProviderError::is_transient`], which the retry wrapper consults.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("provider request failed: {0}")]
    Request(String),
    #[error("provider request timed out")]
    Timeout,
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Connection failures, timeouts, throttling and 5xx answers may succeed
    /// on a later attempt. Everything else is final.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Request(_) | ProviderError::Timeout => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Malformed(e.to_string())
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

// ── HTTP helpers ──────────────────────────────────────────────────────────────

/// Build a client whose every request is bounded by `timeout_seconds`.
pub(crate) fn http_client(timeout_seconds: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))
}

// Error envelopes seen from Hugging Face (`{"error": "..."}`) and openFDA
// (`{"error": {"code": "...", "message": "..."}}`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Structured { error: ErrorBody },
    Plain { error: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// Pass a successful response through, or turn a non-2xx answer into
/// [`ProviderError::Status`] carrying the provider's own message when present.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(ErrorEnvelope::Structured { error }) => match error.code {
            Some(code) => format!("[code={code}] {}", error.message),
            None => error.message,
        },
        Ok(ErrorEnvelope::Plain { error }) => error,
        Err(_) => body,
    };

    warn!(%status, %message, "provider returned HTTP error");
    Err(ProviderError::Status { status: status.as_u16(), message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_are_transient() {
        assert!(ProviderError::Request("connection refused".into()).is_transient());
        assert!(ProviderError::Timeout.is_transient());
    }

    #[test]
    fn throttling_and_server_errors_are_transient() {
        for status in [429, 500, 502, 503] {
            let e = ProviderError::Status { status, message: String::new() };
            assert!(e.is_transient(), "expected HTTP {status} to be transient");
        }
    }

    #[test]
    fn client_errors_are_permanent() {
        for status in [400, 401, 403, 404] {
            let e = ProviderError::Status { status, message: String::new() };
            assert!(!e.is_transient(), "expected HTTP {status} to be permanent");
        }
        assert!(!ProviderError::Malformed("not json".into()).is_transient());
        assert!(!ProviderError::MissingCredential("HF_API_KEY").is_transient());
        assert!(!ProviderError::UnknownProvider("x".into()).is_transient());
    }

    #[test]
    fn status_display_includes_code() {
        let e = ProviderError::Status { status: 503, message: "Model is loading".into() };
        assert_eq!(e.to_string(), "HTTP 503: Model is loading");
    }

    #[test]
    fn error_envelopes_parse() {
        let plain: ErrorEnvelope = serde_json::from_str(r#"{"error":"Model is loading"}"#).unwrap();
        assert!(matches!(plain, ErrorEnvelope::Plain { .. }));

        let structured: ErrorEnvelope =
            serde_json::from_str(r#"{"error":{"code":"NOT_FOUND","message":"No matches found!"}}"#).unwrap();
        match structured {
            ErrorEnvelope::Structured { error } => {
                assert_eq!(error.code.as_deref(), Some("NOT_FOUND"));
                assert_eq!(error.message, "No matches found!");
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[test]
    fn client_builds() {
        assert!(http_client(5).is_ok());
    }
}
