//! Dummy inference backend: no network.
//!
//! `Catalog` answers from a small symptom table so the whole pipeline can be
//! exercised offline. The other modes pin the outcome for tests.

use crate::provider::ProviderError;
use crate::triage::DiseasePrediction;

/// Checked in order; the first symptom contained in the utterance wins.
const CATALOG: &[(&str, &str, f64)] = &[
    ("fever", "Viral Infection", 0.92),
    ("chest pain", "Cardiac Condition", 0.88),
    ("headache", "Migraine", 0.85),
    ("cough", "Respiratory Infection", 0.80),
    ("nausea", "Gastric Issue", 0.75),
];

const FALLBACK: (&str, f64) = ("General Illness", 0.5);

#[derive(Debug, Clone)]
pub enum DummyInference {
    Catalog,
    Fixed(Option<DiseasePrediction>),
    Failing,
    /// Never answers; only a timeout ends the call.
    Stalled,
}

impl DummyInference {
    pub async fn predict(&self, utterance: &str) -> Result<Option<DiseasePrediction>, ProviderError> {
        match self {
            DummyInference::Catalog => Ok(Some(catalog_lookup(utterance))),
            DummyInference::Fixed(prediction) => Ok(prediction.clone()),
            DummyInference::Failing => Err(ProviderError::Request("dummy inference configured to fail".into())),
            DummyInference::Stalled => std::future::pending().await,
        }
    }
}

fn catalog_lookup(utterance: &str) -> DiseasePrediction {
    let lowered = utterance.to_lowercase();
    let (label, score) = CATALOG
        .iter()
        .find(|(symptom, _, _)| lowered.contains(symptom))
        .map(|(_, label, score)| (*label, *score))
        .unwrap_or(FALLBACK);
    DiseasePrediction::new(label, score)
}
