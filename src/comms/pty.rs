//! PTY (console) channel: reads symptom descriptions from stdin and prints
//! the triage reply to stdout.
//!
//! Runs until the `shutdown` token is cancelled (Ctrl-C) or stdin is closed.
//! A turn in flight when shutdown arrives is abandoned, not awaited.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::triage::{TriageError, TriageOrchestrator, render_reply};

use super::{Component, ComponentFuture};

pub const GREETING: &str = "Hello! 👋 I'm your HealthGuard medical assistant. How are you feeling today? \
     Please describe your symptoms or any health concerns you have.";

const THINKING: &str = "… analysing your symptoms";

// ── PtyChannel ───────────────────────────────────────────────────────────────

pub struct PtyChannel {
    channel_id: String,
    bot_name: String,
    orchestrator: TriageOrchestrator,
}

impl PtyChannel {
    pub fn new(channel_id: impl Into<String>, bot_name: impl Into<String>, orchestrator: TriageOrchestrator) -> Self {
        Self { channel_id: channel_id.into(), bot_name: bot_name.into(), orchestrator }
    }
}

impl Component for PtyChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_pty(*self, shutdown))
    }
}

// ── run_pty ──────────────────────────────────────────────────────────────────

async fn run_pty(channel: PtyChannel, shutdown: CancellationToken) -> Result<(), AppError> {
    let PtyChannel { channel_id, bot_name, orchestrator } = channel;

    info!(%channel_id, "pty channel started");
    println!("─────────────────────────────────");
    println!(" {bot_name} console  (Ctrl-C to quit)");
    println!("─────────────────────────────────");
    println!("{GREETING}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!(%channel_id, "pty channel shutting down");
                break;
            }

            line = lines.next_line() => line,
        };

        let input = match line {
            Err(e) => {
                warn!(%channel_id, "pty read error: {e}");
                break;
            }
            Ok(None) => {
                info!(%channel_id, "pty stdin closed");
                break;
            }
            Ok(Some(input)) => input,
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        debug!(%channel_id, chars = input.chars().count(), "pty received line");

        println!("{THINKING}");
        match orchestrator.handle_turn_cancellable(input, &shutdown).await {
            Err(TriageError::Cancelled) => {
                info!(%channel_id, "turn abandoned on shutdown");
                break;
            }
            result => println!("\n{}\n", render_reply(result)),
        }
    }

    Ok(())
}
