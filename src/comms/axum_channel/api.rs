//! Axum handlers for `/api/*` routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::triage::{TriageError, TriageResult, render_reply};

use super::AxumState;

// ── Request types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct TriageRequest {
    message: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let body = json!({
        "status": "ok",
        "channel": &*state.channel_id,
        "inference_provider": state.orchestrator.inference_provider(),
        "medicine_provider": state.orchestrator.medicine_provider(),
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/triage
pub(super) async fn triage(State(state): State<AxumState>, Json(req): Json<TriageRequest>) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "message must not be empty")).into_response();
    }
    debug!(channel_id = %state.channel_id, chars = message.chars().count(), "triage request");

    triage_response(state.orchestrator.handle_turn(message).await)
}

/// A failed turn is still a 200: the client gets the apology to display.
fn triage_response(result: Result<TriageResult, TriageError>) -> Response {
    match result {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            let body = json!({ "error": "unavailable", "message": render_reply(Err(e)) });
            (StatusCode::OK, Json(body)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    use crate::triage::{ComposeError, FALLBACK_APOLOGY};

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn compose_failure_answers_ok_with_apology() {
        let response = triage_response(Err(ComposeError::Render(std::fmt::Error).into()));
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert_eq!(body["error"], "unavailable");
        assert_eq!(body["message"], FALLBACK_APOLOGY);
    }

    #[tokio::test]
    async fn cancelled_turn_answers_ok_with_apology() {
        let response = triage_response(Err(TriageError::Cancelled));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await["message"], FALLBACK_APOLOGY);
    }
}
