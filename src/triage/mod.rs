//! Triage pipeline: classification, composition and per-turn orchestration.
//!
//! ```text
//! utterance ─► severity::classify ─► inference ─► [medicine lookup] ─► compose ─► TriageResult
//! ```
//!
//! Everything here is created fresh for one turn and never mutated after
//! construction. The external collaborators live in [`crate::inference`]
//! and [`crate::medicine`].

pub mod compose;
pub mod orchestrator;
pub mod severity;

pub use compose::{ComposeError, compose};
pub use orchestrator::{FALLBACK_APOLOGY, TriageError, TriageOrchestrator, TurnTimeouts, render_reply};
pub use severity::{SeverityTier, classify};

use serde::Serialize;

/// Condition label predicted for an utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseasePrediction {
    pub label: String,
    /// Always within `[0, 1]`.
    pub confidence: f32,
}

impl DiseasePrediction {
    /// Build a prediction, clamping `score` into `[0, 1]` (NaN becomes 0).
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        let confidence = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) as f32 };
        Self { label: label.into(), confidence }
    }
}

/// One drug-label entry. Absent registry fields have already been replaced
/// by sentinels, except `warnings`, which stays `None` when there are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicineRecord {
    pub name: String,
    pub usage: String,
    pub warnings: Option<String>,
    pub manufacturer: String,
}

/// The composed answer for one turn, the only thing handed back to a channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    pub tier: SeverityTier,
    pub advisory: String,
    pub actions: Vec<String>,
    pub disease_label: Option<String>,
    pub confidence: Option<f32>,
    /// At most three entries, usage and warnings already shortened.
    pub medicines: Vec<MedicineRecord>,
    pub closing: String,
    /// Full rendered text, ready to display.
    pub message: String,
}
