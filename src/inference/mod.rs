//! Disease inference: predicts a condition label for an utterance.
//!
//! `InferenceProvider` is an enum over concrete backends, mirroring how the
//! rest of the bot dispatches to external services without trait objects.
//! [`InferenceProvider::predict`] never fails: every provider error is logged
//! and turned into "no prediction" so a third-party outage cannot block a turn.

pub mod providers;

use tracing::{debug, warn};

use crate::provider::ProviderError;
use crate::triage::DiseasePrediction;

#[derive(Debug, Clone)]
pub enum InferenceProvider {
    HuggingFace(providers::huggingface::HuggingFaceProvider),
    Dummy(providers::dummy::DummyInference),
}

impl InferenceProvider {
    pub fn name(&self) -> &'static str {
        match self {
            InferenceProvider::HuggingFace(_) => "huggingface",
            InferenceProvider::Dummy(_) => "dummy",
        }
    }

    /// Ask the backend for its best candidate, surfacing failures.
    pub async fn try_predict(&self, utterance: &str) -> Result<Option<DiseasePrediction>, ProviderError> {
        match self {
            InferenceProvider::HuggingFace(p) => p.predict(utterance).await,
            InferenceProvider::Dummy(p) => p.predict(utterance).await,
        }
    }

    /// Best candidate for `utterance`, or `None` on any failure or when the
    /// backend's label is not usable.
    pub async fn predict(&self, utterance: &str) -> Option<DiseasePrediction> {
        match self.try_predict(utterance).await {
            Ok(prediction) => prediction.filter(|p| {
                let usable = is_usable_label(&p.label);
                if !usable {
                    debug!(provider = self.name(), label = %p.label, "dropping unusable condition label");
                }
                usable
            }),
            Err(e) => {
                warn!(provider = self.name(), error = %e, "disease inference failed, continuing without a prediction");
                None
            }
        }
    }
}

/// Whether `label` names something worth querying the drug registry for.
///
/// Rejects blank labels, labels without a single letter, and the generic
/// `LABEL_<n>` placeholders emitted by un-finetuned classifier heads.
pub fn is_usable_label(label: &str) -> bool {
    let label = label.trim();
    if label.is_empty() || !label.chars().any(char::is_alphabetic) {
        return false;
    }
    match label.strip_prefix("LABEL_") {
        Some(rest) => rest.is_empty() || !rest.chars().all(|c| c.is_ascii_digit()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::dummy::DummyInference;

    #[test]
    fn usable_labels() {
        for label in ["Viral Infection", "migraine", "COVID-19", "  Flu  "] {
            assert!(is_usable_label(label), "{label:?}");
        }
    }

    #[test]
    fn unusable_labels() {
        for label in ["", "   ", "42", "---", "LABEL_0", "LABEL_17"] {
            assert!(!is_usable_label(label), "{label:?}");
        }
    }

    #[tokio::test]
    async fn failures_become_absence() {
        let provider = InferenceProvider::Dummy(DummyInference::Failing);
        assert!(provider.try_predict("fever").await.is_err());
        assert!(provider.predict("fever").await.is_none());
    }

    #[tokio::test]
    async fn placeholder_labels_are_dropped() {
        for label in ["LABEL_0", "   ", "42"] {
            let provider =
                InferenceProvider::Dummy(DummyInference::Fixed(Some(DiseasePrediction::new(label, 0.9))));
            assert!(provider.predict("fever").await.is_none(), "{label:?}");
        }
    }

    #[tokio::test]
    async fn fixed_prediction_passes_through() {
        let expected = DiseasePrediction::new("Migraine", 0.85);
        let provider = InferenceProvider::Dummy(DummyInference::Fixed(Some(expected.clone())));
        assert_eq!(provider.predict("anything").await, Some(expected));
        assert_eq!(provider.name(), "dummy");
    }
}
