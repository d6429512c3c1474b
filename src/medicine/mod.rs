//! Medicine lookup: drug-label records for a predicted condition.
//!
//! Like inference, `MedicineProvider` is an enum over backends. Records come
//! back fully populated (sentinels for missing names, usage, manufacturer)
//! so the composer never deals with holes. [`MedicineProvider::lookup`]
//! never fails; errors degrade to an empty list.

pub mod providers;

use tracing::warn;

use crate::provider::ProviderError;
use crate::triage::MedicineRecord;

pub const UNKNOWN_MEDICINE: &str = "Unknown Medicine";
pub const USAGE_UNAVAILABLE: &str = "Usage information not available";
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

#[derive(Debug, Clone)]
pub enum MedicineProvider {
    OpenFda(providers::openfda::OpenFdaProvider),
    Dummy(providers::dummy::DummyMedicines),
}

impl MedicineProvider {
    pub fn name(&self) -> &'static str {
        match self {
            MedicineProvider::OpenFda(_) => "openfda",
            MedicineProvider::Dummy(_) => "dummy",
        }
    }

    pub async fn try_lookup(&self, condition_label: &str) -> Result<Vec<MedicineRecord>, ProviderError> {
        match self {
            MedicineProvider::OpenFda(p) => p.lookup(condition_label).await,
            MedicineProvider::Dummy(p) => p.lookup(condition_label).await,
        }
    }

    /// Records in provider relevance order, or an empty list on any failure.
    pub async fn lookup(&self, condition_label: &str) -> Vec<MedicineRecord> {
        match self.try_lookup(condition_label).await {
            Ok(records) => records,
            Err(e) => {
                warn!(provider = self.name(), condition = %condition_label, error = %e, "medicine lookup failed, continuing without medicines");
                Vec::new()
            }
        }
    }
}

/// Registry search term for a condition label: trimmed, lower-cased, with
/// every whitespace run collapsed into a single `_`.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
