//! Deterministic response assembly.
//!
//! Section order is fixed: preamble, tier advisory, medicine section (or a
//! consult line), closing disclaimer. Usage text is cut to 150 characters and
//! warnings to 100, each followed by `...`, so a turn's message stays short.

use std::fmt::Write as _;

use thiserror::Error;

use super::{DiseasePrediction, MedicineRecord, SeverityTier, TriageResult};

pub const PREAMBLE: &str =
    "I understand you're experiencing these symptoms. Based on what you've described, here's my assessment:";
pub const MEDICINES_HEADER: &str = "💊 **Recommended Medicines:**";
/// Shown when a condition was predicted but the registry had nothing for it.
pub const CONSULT_PROVIDER: &str =
    "Please consult with a healthcare provider for personalized medicine recommendations.";
/// Shown when no condition could be predicted at all.
pub const CONSULT_LICENSED_PROVIDER: &str =
    "For specific medicine recommendations, please consult with a licensed healthcare provider.";
pub const CLOSING_DISCLAIMER: &str =
    "📞 If symptoms persist or worsen, don't hesitate to contact your doctor or visit a healthcare facility.";

pub const MAX_MEDICINES: usize = 3;
pub const USAGE_CHAR_LIMIT: usize = 150;
pub const WARNINGS_CHAR_LIMIT: usize = 100;
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to render response: {0}")]
    Render(#[from] std::fmt::Error),
}

/// Keep the first `limit` characters of `text` and mark the cut.
fn shorten(text: &str, limit: usize) -> String {
    let mut out: String = text.chars().take(limit).collect();
    out.push_str(ELLIPSIS);
    out
}

fn presented(record: &MedicineRecord) -> MedicineRecord {
    MedicineRecord {
        name: record.name.clone(),
        usage: shorten(&record.usage, USAGE_CHAR_LIMIT),
        warnings: record.warnings.as_deref().map(|w| shorten(w, WARNINGS_CHAR_LIMIT)),
        manufacturer: record.manufacturer.clone(),
    }
}

/// Combine the three pipeline outputs into one [`TriageResult`].
///
/// Identical inputs always produce an identical result.
pub fn compose(
    tier: SeverityTier,
    prediction: Option<&DiseasePrediction>,
    medicines: &[MedicineRecord],
) -> Result<TriageResult, ComposeError> {
    let shown: Vec<MedicineRecord> = medicines.iter().take(MAX_MEDICINES).map(presented).collect();

    let mut message = String::new();
    write!(message, "{PREAMBLE}\n\n")?;
    write!(message, "{}\n\n", tier.advisory())?;

    if !shown.is_empty() {
        writeln!(message, "{MEDICINES_HEADER}")?;
        for (index, med) in shown.iter().enumerate() {
            write!(message, "\n{}. **{}**\n", index + 1, med.name)?;
            writeln!(message, "   Usage: {}", med.usage)?;
            if let Some(warnings) = &med.warnings {
                writeln!(message, "   ⚠️ Warnings: {warnings}")?;
            }
        }
    } else if prediction.is_some() {
        message.push_str(CONSULT_PROVIDER);
    } else {
        message.push_str(CONSULT_LICENSED_PROVIDER);
    }

    write!(message, "\n\n{CLOSING_DISCLAIMER}")?;

    Ok(TriageResult {
        tier,
        advisory: tier.advisory().to_string(),
        actions: tier.actions().iter().map(|a| a.to_string()).collect(),
        disease_label: prediction.map(|p| p.label.clone()),
        confidence: prediction.map(|p| p.confidence),
        medicines: shown,
        closing: CLOSING_DISCLAIMER.to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, usage: &str, warnings: Option<&str>) -> MedicineRecord {
        MedicineRecord {
            name: name.into(),
            usage: usage.into(),
            warnings: warnings.map(Into::into),
            manufacturer: "Various".into(),
        }
    }

    fn viral() -> DiseasePrediction {
        DiseasePrediction::new("Viral Infection", 0.92)
    }

    #[test]
    fn sections_appear_in_order() {
        let meds = [record("Ibuprofen", "Pain relief", Some("Take with food"))];
        let result = compose(SeverityTier::Moderate, Some(&viral()), &meds).unwrap();
        let msg = &result.message;

        let preamble = msg.find(PREAMBLE).unwrap();
        let advisory = msg.find(SeverityTier::Moderate.advisory()).unwrap();
        let header = msg.find(MEDICINES_HEADER).unwrap();
        let closing = msg.find(CLOSING_DISCLAIMER).unwrap();
        assert!(preamble < advisory && advisory < header && header < closing);
        assert!(msg.ends_with(CLOSING_DISCLAIMER));
    }

    #[test]
    fn exact_rendering_of_one_medicine() {
        let meds = [record("Aspirin", "For fever", None)];
        let result = compose(SeverityTier::Mild, Some(&viral()), &meds).unwrap();
        let expected = format!(
            "{PREAMBLE}\n\n{}\n\n{MEDICINES_HEADER}\n\n1. **Aspirin**\n   Usage: For fever...\n\n\n{CLOSING_DISCLAIMER}",
            SeverityTier::Mild.advisory()
        );
        assert_eq!(result.message, expected);
    }

    #[test]
    fn warnings_line_only_when_present() {
        let meds = [
            record("A", "usage a", Some("careful")),
            record("B", "usage b", None),
        ];
        let result = compose(SeverityTier::Mild, Some(&viral()), &meds).unwrap();
        assert_eq!(result.message.matches("⚠️ Warnings:").count(), 1);
        assert!(result.message.contains("   ⚠️ Warnings: careful...\n"));
    }

    #[test]
    fn at_most_three_medicines_with_truncated_text() {
        let long_usage = "u".repeat(400);
        let long_warning = "w".repeat(400);
        let meds: Vec<_> = (1..=5)
            .map(|i| record(&format!("Drug {i}"), &long_usage, Some(&long_warning)))
            .collect();
        let result = compose(SeverityTier::Mild, Some(&viral()), &meds).unwrap();

        assert_eq!(result.medicines.len(), 3);
        assert!(result.message.contains("3. **Drug 3**"));
        assert!(!result.message.contains("Drug 4"));
        for med in &result.medicines {
            assert_eq!(med.usage, format!("{}...", "u".repeat(USAGE_CHAR_LIMIT)));
            assert_eq!(
                med.warnings.as_deref(),
                Some(format!("{}...", "w".repeat(WARNINGS_CHAR_LIMIT)).as_str())
            );
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let usage = "é".repeat(200);
        let meds = [record("Accented", &usage, None)];
        let result = compose(SeverityTier::Mild, Some(&viral()), &meds).unwrap();
        assert_eq!(result.medicines[0].usage.chars().count(), USAGE_CHAR_LIMIT + ELLIPSIS.len());
    }

    #[test]
    fn prediction_without_medicines_gets_consult_line() {
        let result = compose(SeverityTier::Moderate, Some(&viral()), &[]).unwrap();
        assert!(result.message.contains(CONSULT_PROVIDER));
        assert!(!result.message.contains(MEDICINES_HEADER));
        assert_eq!(result.disease_label.as_deref(), Some("Viral Infection"));
        assert!(result.medicines.is_empty());
    }

    #[test]
    fn no_prediction_gets_licensed_provider_line() {
        let result = compose(SeverityTier::Mild, None, &[]).unwrap();
        assert!(result.message.contains(CONSULT_LICENSED_PROVIDER));
        assert!(!result.message.contains(CONSULT_PROVIDER));
        assert!(result.disease_label.is_none());
        assert!(result.confidence.is_none());
    }

    #[test]
    fn medicine_section_present_iff_medicines_given() {
        let meds = [record("A", "a", None)];
        for prediction in [None, Some(viral())] {
            let with = compose(SeverityTier::Mild, prediction.as_ref(), &meds).unwrap();
            let without = compose(SeverityTier::Mild, prediction.as_ref(), &[]).unwrap();
            assert!(with.message.contains(MEDICINES_HEADER));
            assert!(!without.message.contains(MEDICINES_HEADER));
        }
    }

    #[test]
    fn composition_is_deterministic() {
        let meds = [record("A", "usage", Some("warn")), record("B", "usage", None)];
        let first = compose(SeverityTier::Severe, Some(&viral()), &meds).unwrap();
        let second = compose(SeverityTier::Severe, Some(&viral()), &meds).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.message.as_bytes(), second.message.as_bytes());
    }

    #[test]
    fn result_carries_tier_details() {
        let result = compose(SeverityTier::Severe, None, &[]).unwrap();
        assert_eq!(result.tier, SeverityTier::Severe);
        assert_eq!(result.advisory, SeverityTier::Severe.advisory());
        assert_eq!(result.actions, vec!["Call 911", "Visit ER", "Call Ambulance"]);
        assert_eq!(result.closing, CLOSING_DISCLAIMER);
    }
}
