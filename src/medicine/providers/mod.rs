//! Medicine registry backends.

pub mod dummy;
pub mod openfda;

use std::time::Duration;

use crate::config::MedicineConfig;
use crate::medicine::MedicineProvider;
use crate::provider::ProviderError;
use crate::retry::RetryPolicy;

pub fn build(config: &MedicineConfig) -> Result<MedicineProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(MedicineProvider::Dummy(dummy::DummyMedicines::Catalog)),
        "openfda" | "fda" => {
            let fda = &config.openfda;
            let p = openfda::OpenFdaProvider::new(
                fda.api_url.clone(),
                fda.limit,
                fda.timeout_seconds,
                RetryPolicy::new(fda.retry_attempts, Duration::from_millis(fda.retry_delay_ms)),
            )?;
            Ok(MedicineProvider::OpenFda(p))
        }
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpenFdaConfig;

    fn config(provider: &str) -> MedicineConfig {
        MedicineConfig {
            provider: provider.into(),
            openfda: OpenFdaConfig {
                api_url: "http://127.0.0.1:0/drug/label.json".into(),
                limit: 5,
                timeout_seconds: 1,
                retry_attempts: 1,
                retry_delay_ms: 0,
            },
        }
    }

    #[test]
    fn builds_known_providers() {
        assert_eq!(build(&config("dummy")).unwrap().name(), "dummy");
        assert_eq!(build(&config("openfda")).unwrap().name(), "openfda");
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!(matches!(build(&config("rxnorm")), Err(ProviderError::UnknownProvider(_))));
    }
}
