//! openFDA drug-label registry backend (`/drug/label.json`).
//!
//! Searches `indications_and_usage` for the normalised condition label and
//! caps the result count at the query level. openFDA answers a search with
//! no hits with HTTP 404, which is read as "no records", not as a failure.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::medicine::{UNKNOWN_MANUFACTURER, UNKNOWN_MEDICINE, USAGE_UNAVAILABLE, normalize_label};
use crate::provider::{ProviderError, check_status, http_client};
use crate::retry::{self, RetryPolicy};
use crate::triage::MedicineRecord;

#[derive(Debug, Clone)]
pub struct OpenFdaProvider {
    client: Client,
    api_url: String,
    limit: u32,
    retry: RetryPolicy,
}

impl OpenFdaProvider {
    pub fn new(api_url: String, limit: u32, timeout_seconds: u64, retry: RetryPolicy) -> Result<Self, ProviderError> {
        let client = http_client(timeout_seconds)?;
        Ok(Self { client, api_url, limit: limit.max(1), retry })
    }

    pub async fn lookup(&self, condition_label: &str) -> Result<Vec<MedicineRecord>, ProviderError> {
        let term = normalize_label(condition_label);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let search = format!("indications_and_usage:{term}");
        let limit = self.limit.to_string();
        let (search, limit) = (search.as_str(), limit.as_str());

        debug!(url = %self.api_url, %search, limit, "querying drug label registry");

        let Some(body) = retry::with_backoff(self.retry, move || self.request(search, limit)).await? else {
            debug!(%search, "registry has no matching labels");
            return Ok(Vec::new());
        };

        let records: Vec<MedicineRecord> = body
            .results
            .into_iter()
            .take(self.limit as usize)
            .map(MedicineRecord::from)
            .collect();
        debug!(records = records.len(), "received drug labels");
        Ok(records)
    }

    async fn request(&self, search: &str, limit: &str) -> Result<Option<DrugLabelResponse>, ProviderError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("search", search), ("limit", limit)])
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_status(response).await?;
        response
            .json::<DrugLabelResponse>()
            .await
            .map(Some)
            .map_err(ProviderError::from_reqwest)
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DrugLabelResponse {
    #[serde(default)]
    results: Vec<DrugLabel>,
}

#[derive(Debug, Default, Deserialize)]
struct DrugLabel {
    #[serde(default)]
    openfda: OpenFdaFields,
    #[serde(default)]
    indications_and_usage: Vec<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenFdaFields {
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    generic_name: Vec<String>,
    #[serde(default)]
    manufacturer_name: Vec<String>,
}

/// First entry of a registry field, if it holds any text.
fn first_text(values: Vec<String>) -> Option<String> {
    values
        .into_iter()
        .next()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<DrugLabel> for MedicineRecord {
    fn from(label: DrugLabel) -> Self {
        let OpenFdaFields { brand_name, generic_name, manufacturer_name } = label.openfda;
        MedicineRecord {
            name: first_text(brand_name)
                .or_else(|| first_text(generic_name))
                .unwrap_or_else(|| UNKNOWN_MEDICINE.to_string()),
            usage: first_text(label.indications_and_usage).unwrap_or_else(|| USAGE_UNAVAILABLE.to_string()),
            warnings: first_text(label.warnings),
            manufacturer: first_text(manufacturer_name).unwrap_or_else(|| UNKNOWN_MANUFACTURER.to_string()),
        }
    }
}
