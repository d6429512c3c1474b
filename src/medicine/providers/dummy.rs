//! Dummy medicine registry: answers from a built-in table, no network.

use crate::medicine::normalize_label;
use crate::provider::ProviderError;
use crate::triage::MedicineRecord;

type Entry = (&'static str, &'static str, &'static str, &'static str);

const VIRAL_INFECTION: &[Entry] = &[
    (
        "Paracetamol (Acetaminophen)",
        "Used for pain relief and fever reduction. Typical dose: 500-1000mg every 4-6 hours",
        "Do not exceed 4000mg per day. Consult if liver disease present",
        "Various",
    ),
    (
        "Ibuprofen",
        "Anti-inflammatory pain reliever for fever and aches. Typical dose: 200-400mg every 4-6 hours",
        "May cause stomach upset. Take with food. Not recommended if ulcer history",
        "Various",
    ),
    (
        "Aspirin",
        "For fever and general pain relief in adults. Typical dose: 500mg every 4-6 hours",
        "Do not give to children. May cause stomach irritation",
        "Various",
    ),
];

const MIGRAINE: &[Entry] = &[
    (
        "Sumatriptan",
        "Specific migraine treatment. Typical dose: 25-100mg as needed",
        "Only use for migraines, not regular headaches. May cause drowsiness",
        "Glaxo SmithKline",
    ),
    (
        "Ibuprofen",
        "Standard pain relief for migraines. Typical dose: 400-600mg",
        "Best taken early in migraine onset. Take with food",
        "Various",
    ),
];

const RESPIRATORY_INFECTION: &[Entry] = &[
    (
        "Dextromethorphan",
        "Cough suppressant. Typical dose: 10-20mg every 4-6 hours",
        "Do not use if taking antidepressants. May cause drowsiness",
        "Various",
    ),
    (
        "Guaifenesin",
        "Expectorant to thin mucus. Typical dose: 200-400mg every 4 hours",
        "Generally safe. Drink plenty of water",
        "Various",
    ),
];

/// Keyed by normalised condition label.
const CATALOG: &[(&str, &[Entry])] = &[
    ("viral_infection", VIRAL_INFECTION),
    ("migraine", MIGRAINE),
    ("respiratory_infection", RESPIRATORY_INFECTION),
];

#[derive(Debug, Clone)]
pub enum DummyMedicines {
    Catalog,
    Fixed(Vec<MedicineRecord>),
    Failing,
    /// Never answers; only a timeout ends the call.
    Stalled,
}

impl DummyMedicines {
    pub async fn lookup(&self, condition_label: &str) -> Result<Vec<MedicineRecord>, ProviderError> {
        match self {
            DummyMedicines::Catalog => Ok(catalog_lookup(condition_label)),
            DummyMedicines::Fixed(records) => Ok(records.clone()),
            DummyMedicines::Failing => Err(ProviderError::Request("dummy registry configured to fail".into())),
            DummyMedicines::Stalled => std::future::pending().await,
        }
    }
}

fn catalog_lookup(condition_label: &str) -> Vec<MedicineRecord> {
    let key = normalize_label(condition_label);
    CATALOG
        .iter()
        .find(|(condition, _)| *condition == key)
        .map(|(_, entries)| {
            entries
                .iter()
                .map(|(name, usage, warnings, manufacturer)| MedicineRecord {
                    name: name.to_string(),
                    usage: usage.to_string(),
                    warnings: Some(warnings.to_string()),
                    manufacturer: manufacturer.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
