//! Axum-based HTTP channel for the triage bot.
//!
//! ```text
//! GET  /api/health : liveness plus active backend names
//! POST /api/triage : { "message": "..." } → TriageResult JSON
//! ```
//!
//! `run()` drives the axum event loop; the shared [`CancellationToken`] is
//! wired to axum's graceful shutdown.

mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::triage::TriageOrchestrator;

use super::{Component, ComponentFuture};

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler. Cheap to clone.
#[derive(Clone)]
pub(crate) struct AxumState {
    pub channel_id: Arc<str>,
    pub orchestrator: Arc<TriageOrchestrator>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    orchestrator: TriageOrchestrator,
}

impl AxumChannel {
    pub fn new(channel_id: impl Into<String>, bind_addr: impl Into<String>, orchestrator: TriageOrchestrator) -> Self {
        Self { channel_id: channel_id.into(), bind_addr: bind_addr.into(), orchestrator }
    }
}

impl Component for AxumChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_axum(self.channel_id, self.bind_addr, self.orchestrator, shutdown))
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

async fn run_axum(
    channel_id: String,
    bind_addr: String,
    orchestrator: TriageOrchestrator,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = router_with_id(&channel_id, orchestrator);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Comms(format!("axum bind failed on {bind_addr}: {e}")))?;

    info!(%channel_id, %bind_addr, "axum channel listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

    info!(%channel_id, "axum channel shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Router serving the triage API, without binding a socket.
pub fn router(orchestrator: TriageOrchestrator) -> Router {
    router_with_id("axum", orchestrator)
}

fn router_with_id(channel_id: &str, orchestrator: TriageOrchestrator) -> Router {
    let state = AxumState { channel_id: Arc::from(channel_id), orchestrator: Arc::new(orchestrator) };

    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/triage", post(api::triage))
        .with_state(state)
}
