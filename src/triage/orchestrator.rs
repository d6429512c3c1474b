//! Per-turn orchestration.
//!
//! A turn classifies the utterance, asks the inference backend for a
//! condition, looks up medicines for that condition when there is one, and
//! composes the result. Each external call runs under its own time budget;
//! a call that overruns is treated exactly like a failed call.

use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::inference::{self, InferenceProvider};
use crate::medicine::{self, MedicineProvider};
use crate::provider::ProviderError;

use super::{ComposeError, DiseasePrediction, MedicineRecord, TriageResult, compose, severity};

/// Shown instead of a result when a turn cannot be completed.
pub const FALLBACK_APOLOGY: &str = "I'm having trouble processing this right now, please try again. 😔";

#[derive(Debug, Error)]
pub enum TriageError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("turn cancelled")]
    Cancelled,
}

/// Text to show for a finished turn: the composed message, or the apology
/// when the turn produced no result.
pub fn render_reply(result: Result<TriageResult, TriageError>) -> String {
    match result {
        Ok(result) => result.message,
        Err(e) => {
            warn!(error = %e, "turn failed, sending apology");
            FALLBACK_APOLOGY.to_string()
        }
    }
}

/// Wall-clock budget for each external call in a turn, retries included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimeouts {
    pub inference: Duration,
    pub lookup: Duration,
}

impl Default for TurnTimeouts {
    fn default() -> Self {
        Self { inference: Duration::from_secs(30), lookup: Duration::from_secs(20) }
    }
}

/// Runs triage turns. Holds only immutable clients, so one instance can be
/// cloned into every channel and serve concurrent conversations.
#[derive(Debug, Clone)]
pub struct TriageOrchestrator {
    inference: InferenceProvider,
    medicine: MedicineProvider,
    timeouts: TurnTimeouts,
}

impl TriageOrchestrator {
    pub fn new(inference: InferenceProvider, medicine: MedicineProvider, timeouts: TurnTimeouts) -> Self {
        Self { inference, medicine, timeouts }
    }

    /// Build both backends from the resolved config.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let inference = inference::providers::build(&config.inference, config.inference_api_key.clone())?;
        let medicine = medicine::providers::build(&config.medicine)?;
        Ok(Self::new(inference, medicine, config.turn.timeouts()))
    }

    pub fn inference_provider(&self) -> &str {
        self.inference.name()
    }

    pub fn medicine_provider(&self) -> &str {
        self.medicine.name()
    }

    pub fn timeouts(&self) -> TurnTimeouts {
        self.timeouts
    }

    /// Run one full turn for `utterance`.
    ///
    /// Inference and lookup problems never surface here; they only shrink
    /// the answer. The only error is a failure to render the response.
    pub async fn handle_turn(&self, utterance: &str) -> Result<TriageResult, TriageError> {
        let turn_id = Uuid::now_v7();

        let (tier, matched) = severity::classify_with_match(utterance);
        debug!(%turn_id, %tier, keyword = matched.unwrap_or("-"), "classified utterance");

        let prediction = self.infer(turn_id, utterance).await;

        let medicines = match &prediction {
            Some(p) => self.look_up(turn_id, &p.label).await,
            None => {
                debug!(%turn_id, "no condition predicted, skipping medicine lookup");
                Vec::new()
            }
        };

        let result = compose(tier, prediction.as_ref(), &medicines)?;

        info!(
            %turn_id,
            %tier,
            condition = result.disease_label.as_deref().unwrap_or("-"),
            medicines = result.medicines.len(),
            "turn complete"
        );
        Ok(result)
    }

    /// Like [`handle_turn`](Self::handle_turn), but gives up as soon as
    /// `cancel` fires.
    pub async fn handle_turn_cancellable(
        &self,
        utterance: &str,
        cancel: &CancellationToken,
    ) -> Result<TriageResult, TriageError> {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("turn cancelled before completion");
                Err(TriageError::Cancelled)
            }

            result = self.handle_turn(utterance) => result,
        }
    }

    /// Rendered reply text for `utterance`, or the apology if the turn failed.
    pub async fn reply(&self, utterance: &str) -> String {
        render_reply(self.handle_turn(utterance).await)
    }

    async fn infer(&self, turn_id: Uuid, utterance: &str) -> Option<DiseasePrediction> {
        match timeout(self.timeouts.inference, self.inference.predict(utterance)).await {
            Ok(prediction) => {
                if let Some(p) = &prediction {
                    debug!(%turn_id, label = %p.label, confidence = p.confidence, "condition predicted");
                }
                prediction
            }
            Err(_) => {
                warn!(
                    %turn_id,
                    provider = self.inference.name(),
                    budget_ms = self.timeouts.inference.as_millis() as u64,
                    "disease inference timed out"
                );
                None
            }
        }
    }

    async fn look_up(&self, turn_id: Uuid, label: &str) -> Vec<MedicineRecord> {
        match timeout(self.timeouts.lookup, self.medicine.lookup(label)).await {
            Ok(records) => {
                debug!(%turn_id, condition = %label, records = records.len(), "medicine lookup finished");
                records
            }
            Err(_) => {
                warn!(
                    %turn_id,
                    provider = self.medicine.name(),
                    condition = %label,
                    budget_ms = self.timeouts.lookup.as_millis() as u64,
                    "medicine lookup timed out"
                );
                Vec::new()
            }
        }
    }
}
