//! Classifier
//!
//! Maps an anomaly score to one of three ordered labels at fixed breakpoints,
//! plus the fixed rejection classification the sanity filter emits. Labels
//! are heuristic statistical opinions, not cryptographic judgments.

use serde::{Deserialize, Serialize};

/// Scores below this classify as compatible.
pub const THRESHOLD_ATYPICAL: f64 = 1.5;
/// Scores at or above this classify as artificial-structure.
pub const THRESHOLD_ARTIFICIAL: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Compatible,
    Atypical,
    ArtificialStructure,
    /// Rejected outright by the sanity filter, never scored.
    Artificial,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Compatible => "compatible",
            Label::Atypical => "atypical",
            Label::ArtificialStructure => "artificial-structure",
            Label::Artificial => "artificial",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub label: Label,
    pub note: &'static str,
}

/// Partition the score axis into the three ordered regions.
pub fn classify(score: f64) -> Classification {
    if score < THRESHOLD_ATYPICAL {
        Classification {
            label: Label::Compatible,
            note: "structural trace consistent with the reference baseline",
        }
    } else if score < THRESHOLD_ARTIFICIAL {
        Classification {
            label: Label::Atypical,
            note: "structural trace deviates from the reference; manual review recommended",
        }
    } else {
        Classification {
            label: Label::ArtificialStructure,
            note: "structural trace far outside the reference envelope; structure appears constructed",
        }
    }
}

/// Fixed classification for sanity-filter rejections.
pub fn rejected() -> Classification {
    Classification {
        label: Label::Artificial,
        note: "rejected by pre-scoring plausibility checks",
    }
}

/// Templated per-item summary line used in the text report.
pub fn summary_line(number: &str, classification: &Classification) -> String {
    format!(
        "Integer {} classified as {}: {}",
        number,
        classification.label.as_str(),
        classification.note
    )
}
