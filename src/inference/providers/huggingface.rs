//! Hugging Face Inference API text-classification backend.
//!
//! POSTs `{"inputs": <utterance>}` with a bearer token and picks the best
//! candidate from the answer. The API returns either a flat candidate list
//! or, for single-input classification, a list nested one level deeper;
//! both shapes are accepted. Wire types are private to this module.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::inference::is_usable_label;
use crate::provider::{ProviderError, check_status, http_client};
use crate::retry::{self, RetryPolicy};
use crate::triage::DiseasePrediction;

const API_KEY_VAR: &str = "HF_API_KEY";

/// Constructed once at startup, then cheaply cloned, `reqwest::Client` is
/// an `Arc` internally.
#[derive(Debug, Clone)]
pub struct HuggingFaceProvider {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HuggingFaceProvider {
    pub fn new(
        api_url: String,
        timeout_seconds: u64,
        api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Result<Self, ProviderError> {
        let client = http_client(timeout_seconds)?;
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Ok(Self { client, api_url, api_key, retry })
    }

    /// Highest-scoring usable candidate, `Ok(None)` when the model offered none.
    pub async fn predict(&self, utterance: &str) -> Result<Option<DiseasePrediction>, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ProviderError::MissingCredential(API_KEY_VAR));
        };

        let payload = InferenceRequest { inputs: utterance };
        let payload = &payload;

        debug!(url = %self.api_url, content_len = utterance.len(), "sending inference request");

        let body = retry::with_backoff(self.retry, move || self.request(api_key, payload)).await?;
        trace!(body = %body, "inference response body");

        let candidates = parse_candidates(&body)?;
        debug!(candidates = candidates.len(), "received inference response");
        Ok(top_candidate(candidates))
    }

    async fn request(&self, api_key: &str, payload: &InferenceRequest<'_>) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let response = check_status(response).await?;
        response.text().await.map_err(ProviderError::from_reqwest)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<Candidate>>),
    Flat(Vec<Candidate>),
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

fn parse_candidates(body: &str) -> Result<Vec<Candidate>, ProviderError> {
    let parsed: InferenceResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("unexpected inference response shape: {e}")))?;
    Ok(match parsed {
        InferenceResponse::Nested(groups) => groups.into_iter().next().unwrap_or_default(),
        InferenceResponse::Flat(candidates) => candidates,
    })
}

/// Ties keep the provider's order.
fn top_candidate(candidates: Vec<Candidate>) -> Option<DiseasePrediction> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let label = c.label?.trim().to_string();
            is_usable_label(&label).then(|| DiseasePrediction::new(label, c.score.unwrap_or(0.0)))
        })
        .fold(None, |best: Option<DiseasePrediction>, next| match best {
            Some(best) if best.confidence >= next.confidence => Some(best),
            _ => Some(next),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(body: &str) -> Option<DiseasePrediction> {
        top_candidate(parse_candidates(body).unwrap())
    }

    #[test]
    fn flat_response_picks_highest_score() {
        let p = top(r#"[{"label":"Migraine","score":0.4},{"label":"Viral Infection","score":0.92}]"#).unwrap();
        assert_eq!(p.label, "Viral Infection");
        assert!((p.confidence - 0.92).abs() < 1e-6);
    }

    #[test]
    fn nested_response_is_unwrapped() {
        let p = top(r#"[[{"label":"Cardiac Condition","score":0.88},{"label":"Anxiety","score":0.1}]]"#).unwrap();
        assert_eq!(p.label, "Cardiac Condition");
    }

    #[test]
    fn ties_keep_first_candidate() {
        let p = top(r#"[{"label":"First","score":0.5},{"label":"Second","score":0.5}]"#).unwrap();
        assert_eq!(p.label, "First");
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let p = top(r#"[{"label":"Gastric Issue"}]"#).unwrap();
        assert_eq!(p.confidence, 0.0);
    }

    #[test]
    fn unusable_candidates_are_skipped() {
        let p = top(r#"[{"label":"LABEL_1","score":0.99},{"label":"  Flu ","score":0.3}]"#).unwrap();
        assert_eq!(p.label, "Flu");
        assert!(top(r#"[{"label":"LABEL_0","score":0.6},{"score":0.4}]"#).is_none());
    }

    #[test]
    fn empty_lists_yield_nothing() {
        assert!(top("[]").is_none());
        assert!(top("[[]]").is_none());
    }

    #[test]
    fn non_list_bodies_are_malformed() {
        for body in [r#"{"error":"Model is loading"}"#, "not json", r#""text""#] {
            assert!(matches!(parse_candidates(body), Err(ProviderError::Malformed(_))), "{body}");
        }
    }

    #[test]
    fn request_serializes_inputs() {
        let json = serde_json::to_string(&InferenceRequest { inputs: "mild fever" }).unwrap();
        assert_eq!(json, r#"{"inputs":"mild fever"}"#);
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let provider = HuggingFaceProvider::new(
            "http://127.0.0.1:9/unreachable".into(),
            1,
            Some("   ".into()),
            RetryPolicy::once(),
        )
        .unwrap();
        assert!(matches!(
            provider.predict("fever").await,
            Err(ProviderError::MissingCredential("HF_API_KEY"))
        ));
    }
}
