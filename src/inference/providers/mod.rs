//! Inference backends.
//!
//! `build(config, api_key)` is the factory: called once at startup.

pub mod dummy;
pub mod huggingface;

use std::time::Duration;

use crate::config::InferenceConfig;
use crate::inference::InferenceProvider;
use crate::provider::ProviderError;
use crate::retry::RetryPolicy;

/// Construct the configured backend.
///
/// `api_key` comes from `HF_API_KEY` (never TOML). A missing key is not an
/// error here: the Hugging Face backend reports it per call, which the
/// pipeline absorbs as "no prediction".
pub fn build(config: &InferenceConfig, api_key: Option<String>) -> Result<InferenceProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(InferenceProvider::Dummy(dummy::DummyInference::Catalog)),
        "huggingface" | "hf" => {
            let hf = &config.huggingface;
            let p = huggingface::HuggingFaceProvider::new(
                hf.api_url.clone(),
                hf.timeout_seconds,
                api_key,
                RetryPolicy::new(hf.retry_attempts, Duration::from_millis(hf.retry_delay_ms)),
            )?;
            Ok(InferenceProvider::HuggingFace(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}
