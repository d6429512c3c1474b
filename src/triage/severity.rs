//! Keyword-based severity classification.
//!
//! Tiers are checked in a fixed priority order (severe, then moderate) and
//! the first tier with a matching keyword wins. An utterance that mentions
//! both a severe and a moderate symptom is therefore always severe.
//! Anything that matches neither list is mild.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityTier {
    Severe,
    Moderate,
    Mild,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Severe => "severe",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Mild => "mild",
        }
    }

    /// Fixed advisory shown to the user for this tier.
    pub fn advisory(self) -> &'static str {
        match self {
            SeverityTier::Severe => {
                "⚠️ URGENT: You should seek immediate medical attention at a hospital or call emergency services. Your symptoms suggest a serious condition."
            }
            SeverityTier::Moderate => {
                "📋 Important: Monitor your condition closely and consult a doctor soon. If symptoms worsen, seek immediate medical attention."
            }
            SeverityTier::Mild => {
                "✅ For now: Rest well, stay hydrated, and take basic medicines. If symptoms persist beyond 3 days, consult a healthcare provider."
            }
        }
    }

    /// Suggested next actions, most urgent first.
    pub fn actions(self) -> &'static [&'static str] {
        match self {
            SeverityTier::Severe => &["Call 911", "Visit ER", "Call Ambulance"],
            SeverityTier::Moderate => &["See Doctor", "Call Clinic", "Wait & Monitor"],
            SeverityTier::Mild => &["Rest", "Hydrate", "Take Medicine", "Monitor"],
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SEVERE_KEYWORDS: &[&str] = &[
    "chest pain",
    "breathing difficulty",
    "unconscious",
    "severe bleeding",
    "choking",
    "emergency",
    "critical",
    "collapsed",
    "fracture",
    "severe burn",
    "poisoning",
    "overdose",
    "allergic reaction",
    "anaphylaxis",
];

const MODERATE_KEYWORDS: &[&str] = &[
    "persistent fever",
    "infection",
    "worsening symptoms",
    "severe pain",
    "vomiting",
    "dizziness",
    "confusion",
    "persistent cough",
    "difficult breathing",
    "severe headache",
    "abdominal pain",
];

/// Priority order. Mild has no keywords; it is the fallback.
const TIERS: &[(SeverityTier, &[&str])] = &[
    (SeverityTier::Severe, SEVERE_KEYWORDS),
    (SeverityTier::Moderate, MODERATE_KEYWORDS),
];

/// Classify `utterance` and report which keyword decided the tier.
pub fn classify_with_match(utterance: &str) -> (SeverityTier, Option<&'static str>) {
    let lowered = utterance.to_lowercase();
    for (tier, kws) in TIERS {
        if let Some(kw) = kws.iter().find(|kw| lowered.contains(*kw)) {
            return (*tier, Some(*kw));
        }
    }
    (SeverityTier::Mild, None)
}

pub fn classify(utterance: &str) -> SeverityTier {
    classify_with_match(utterance).0
}
