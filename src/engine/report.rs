//! Audit report types
//!
//! The report is assembled once per audit call and consumed read-only by the
//! transport layer and the document writers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::baseline::{BaselineMode, EmpiricalBaseline};
use super::classify::Label;

/// Caller-supplied audit options.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditOptions {
    /// Multiplier on the anomaly score, bounded to [0.1, 5.0].
    pub sensitivity: f64,
    /// Echoed back in the report; does not change classification.
    pub annotation_threshold: Option<f64>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            annotation_threshold: None,
        }
    }
}

/// Baseline summary included in every report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum BaselineSummary {
    Empirical(EmpiricalBaseline),
    Calibrated {
        bit_length_floor: u64,
        deviation_coefficient: f64,
    },
}

/// Per-integer outcome, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    /// Decimal representation of the input integer.
    pub number: String,
    /// Bit length of the normalized (odd) integer.
    pub bit_length: u64,
    pub trace: Option<f64>,
    pub score: Option<f64>,
    pub label: Label,
    pub note: String,
    /// Triggered sanity-filter reasons; empty unless the item was rejected.
    pub reasons: Vec<String>,
    pub summary: String,
}

/// Immutable audit report.
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub report_id: Uuid,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub mode: BaselineMode,
    pub sensitivity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation_threshold: Option<f64>,
    pub baseline: BaselineSummary,
    pub results: Vec<ItemResult>,
}
