//! Comms: the channels a user talks to the triage bot through.
//!
//! Each channel (console, HTTP) implements [`Component`] and is spawned as
//! an independent task by [`start`]. Channels capture a clone of the shared
//! [`TriageOrchestrator`] at construction; the generic [`Component::run`]
//! signature only carries the shutdown token.
//!
//! Any channel error cancels the shared token so siblings stop cooperatively.

#[cfg(feature = "channel-axum")]
pub mod axum_channel;
#[cfg(feature = "channel-pty")]
pub mod pty;

use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::triage::TriageOrchestrator;

// ── Component ─────────────────────────────────────────────────────────────────

/// A boxed, owned future returned by [`Component::run`].
pub type ComponentFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// A concurrently-runnable channel.
pub trait Component: Send + 'static {
    /// Stable identifier used in log messages.
    fn id(&self) -> &str;

    /// Consume the component and return its run-loop. The future should
    /// return once `shutdown` is cancelled or its input is exhausted.
    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture;
}

// ── CommsHandle ───────────────────────────────────────────────────────────────

/// Resolves when every spawned channel has exited.
pub struct CommsHandle {
    inner: JoinHandle<Result<(), AppError>>,
}

impl CommsHandle {
    /// Await all channels and return the first error, if any.
    pub async fn join(self) -> Result<(), AppError> {
        match self.inner.await {
            Ok(r) => r,
            Err(e) => Err(AppError::Comms(format!("comms task panicked: {e}"))),
        }
    }
}

/// Spawn each component as its own task.
///
/// If one returns `Err` or panics, `shutdown` is cancelled and the first
/// error is reported once the rest have drained.
pub fn spawn_components(components: Vec<Box<dyn Component>>, shutdown: CancellationToken) -> CommsHandle {
    let inner = tokio::spawn(async move {
        let mut set: JoinSet<Result<(), AppError>> = JoinSet::new();

        for component in components {
            debug!(component = %component.id(), "spawning component");
            set.spawn(component.run(shutdown.clone()));
        }

        let mut first_err: Option<AppError> = None;

        while let Some(res) = set.join_next().await {
            match res {
                Err(e) => {
                    error!("component panicked: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert_with(|| AppError::Comms(format!("component panicked: {e}")));
                }
                Ok(Err(e)) => {
                    error!("component error: {e}");
                    shutdown.cancel();
                    first_err.get_or_insert(e);
                }
                Ok(Ok(())) => {}
            }
        }

        first_err.map_or(Ok(()), Err)
    });

    CommsHandle { inner }
}

// ── start ─────────────────────────────────────────────────────────────────────

/// Build the configured channels and spawn them. Returns immediately.
pub fn start(config: &Config, orchestrator: TriageOrchestrator, shutdown: CancellationToken) -> CommsHandle {
    let mut components: Vec<Box<dyn Component>> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            components.push(Box::new(pty::PtyChannel::new("pty0", &config.bot_name, orchestrator.clone())));
        }
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms_http_should_load() {
            info!(bind = %config.comms.http.bind, "loading axum channel");
            components.push(Box::new(axum_channel::AxumChannel::new(
                "axum0",
                config.comms.http.bind.clone(),
                orchestrator.clone(),
            )));
        }
    }

    if components.is_empty() {
        info!("no comms channels configured");
    }

    spawn_components(components, shutdown)
}
