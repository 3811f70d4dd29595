//! Structural audit engine
//!
//! Pipeline: integer -> residue mapper -> feature operator -> trace
//! extractor -> trace. Batch traces feed the baseline engine, whose output
//! combines with each trace into an anomaly score, which the classifier
//! maps to a label. `AuditEngine` is the orchestrator and the only entry
//! point the transport layer consumes.
//!
//! The engine is pure: no I/O, no logger setup, no mutable state beyond the
//! read-only configuration fixed at construction. Classifications are
//! heuristic statistical opinions, never cryptographic verdicts.

pub mod baseline;
pub mod classify;
pub mod descriptor;
pub mod features;
pub mod report;
pub mod sanity;
pub mod trace;

use num_bigint::BigUint;
use thiserror::Error;
use uuid::Uuid;

use self::baseline::{BaselineMode, EmpiricalBaseline};
use self::classify::Classification;
use self::descriptor::StructuralDescriptor;
use self::features::FeatureVector;
use self::report::{AuditOptions, AuditReport, BaselineSummary, ItemResult};
use self::trace::TraceWeights;

/// Version tag stamped into every report.
pub const ENGINE_VERSION: &str = concat!("modaudit/", env!("CARGO_PKG_VERSION"));

/// Maximum batch size per audit call.
pub const MAX_BATCH_SIZE: usize = 10;
pub const SENSITIVITY_MIN: f64 = 0.1;
pub const SENSITIVITY_MAX: f64 = 5.0;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InputValidation(String),

    #[error("batch must not be empty")]
    EmptyBatch,

    #[error("batch size {0} exceeds maximum {}", MAX_BATCH_SIZE)]
    BatchTooLarge(usize),

    #[error("sensitivity {0} outside [{}, {}]", SENSITIVITY_MIN, SENSITIVITY_MAX)]
    SensitivityOutOfRange(f64),

    #[error("modulus list must not be empty")]
    EmptyModuli,
}

/// Immutable engine configuration, fixed at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub moduli: Vec<u64>,
    pub mode: BaselineMode,
    pub target_bits: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            moduli: descriptor::DEFAULT_MODULI.to_vec(),
            mode: BaselineMode::Empirical,
            target_bits: 2048,
        }
    }
}

/// Single-item diagnostic record for the `compute` operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Computation {
    pub number: String,
    pub descriptor: StructuralDescriptor,
    pub features: FeatureVector,
    pub trace: f64,
}

enum ItemOutcome {
    Scored { trace: f64 },
    Rejected { reasons: Vec<&'static str> },
}

struct PreparedItem {
    number: String,
    bit_length: u64,
    outcome: ItemOutcome,
}

/// The audit orchestrator.
pub struct AuditEngine {
    config: EngineConfig,
}

impl AuditEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        if config.moduli.is_empty() {
            return Err(EngineError::EmptyModuli);
        }
        if let Some(&m) = config.moduli.iter().find(|&&m| m < 2) {
            return Err(EngineError::InputValidation(format!(
                "modulus {} is not a valid modulus",
                m
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn weights(&self) -> &'static TraceWeights {
        match self.config.mode {
            BaselineMode::Empirical => &trace::EMPIRICAL_WEIGHTS,
            BaselineMode::Calibrated => &trace::CALIBRATED_WEIGHTS,
        }
    }

    /// Single-item evaluation: descriptor, features and trace for one
    /// integer. Usable for diagnostics; never consults batch state.
    pub fn compute(&self, n: &BigUint) -> Result<Computation, EngineError> {
        let normalized = descriptor::normalize(n)?;
        let d = descriptor::map(&normalized, &self.config.moduli)?;
        let f = features::reduce(&d, self.config.target_bits);
        let t = trace::extract(&f, self.weights());
        if !t.is_finite() {
            return Err(EngineError::InputValidation(format!(
                "trace for {} is not finite",
                n
            )));
        }
        Ok(Computation {
            number: n.to_string(),
            descriptor: d,
            features: f,
            trace: t,
        })
    }

    /// Batch evaluation: validates bounds, runs the pipeline over every
    /// integer, derives the baseline, scores and classifies, and assembles
    /// the report in input order. Fails atomically on the first invalid
    /// input; sanity-filter rejections are outcomes, not errors.
    pub fn audit(
        &self,
        numbers: &[BigUint],
        options: &AuditOptions,
    ) -> Result<AuditReport, EngineError> {
        if numbers.is_empty() {
            return Err(EngineError::EmptyBatch);
        }
        if numbers.len() > MAX_BATCH_SIZE {
            return Err(EngineError::BatchTooLarge(numbers.len()));
        }
        let sensitivity = options.sensitivity;
        if !sensitivity.is_finite() || !(SENSITIVITY_MIN..=SENSITIVITY_MAX).contains(&sensitivity) {
            return Err(EngineError::SensitivityOutOfRange(sensitivity));
        }

        let prepared = numbers
            .iter()
            .map(|n| self.prepare(n))
            .collect::<Result<Vec<_>, _>>()?;

        let (baseline_summary, results) = match self.config.mode {
            BaselineMode::Empirical => self.score_empirical(&prepared, sensitivity)?,
            BaselineMode::Calibrated => (
                BaselineSummary::Calibrated {
                    bit_length_floor: sanity::MIN_MODULUS_BITS,
                    deviation_coefficient: baseline::CALIBRATED_DEVIATION_COEFFICIENT,
                },
                self.score_calibrated(&prepared, sensitivity),
            ),
        };

        Ok(AuditReport {
            report_id: Uuid::new_v4(),
            version: ENGINE_VERSION.to_string(),
            generated_at: chrono::Utc::now(),
            mode: self.config.mode,
            sensitivity,
            annotation_threshold: options.annotation_threshold,
            baseline: baseline_summary,
            results,
        })
    }

    fn prepare(&self, n: &BigUint) -> Result<PreparedItem, EngineError> {
        let normalized = descriptor::normalize(n)?;
        let d = descriptor::map(&normalized, &self.config.moduli)?;

        if self.config.mode == BaselineMode::Calibrated {
            let decimal = normalized.to_str_radix(10);
            let reasons = sanity::check(&d, &decimal);
            if !reasons.is_empty() {
                return Ok(PreparedItem {
                    number: n.to_string(),
                    bit_length: d.bit_length,
                    outcome: ItemOutcome::Rejected { reasons },
                });
            }
        }

        let f = features::reduce(&d, self.config.target_bits);
        let t = trace::extract(&f, self.weights());
        if !t.is_finite() {
            // a non-finite trace would corrupt the batch baseline
            return Err(EngineError::InputValidation(format!(
                "trace for {} is not finite",
                n
            )));
        }
        Ok(PreparedItem {
            number: n.to_string(),
            bit_length: d.bit_length,
            outcome: ItemOutcome::Scored { trace: t },
        })
    }

    fn score_empirical(
        &self,
        items: &[PreparedItem],
        sensitivity: f64,
    ) -> Result<(BaselineSummary, Vec<ItemResult>), EngineError> {
        let traces: Vec<f64> = items
            .iter()
            .filter_map(|i| match i.outcome {
                ItemOutcome::Scored { trace } => Some(trace),
                ItemOutcome::Rejected { .. } => None,
            })
            .collect();

        // the sanity filter never runs in empirical mode, so a non-empty
        // batch always yields at least one trace
        let fitted = EmpiricalBaseline::fit(&traces).ok_or(EngineError::EmptyBatch)?;

        let results = items
            .iter()
            .map(|item| match &item.outcome {
                ItemOutcome::Scored { trace } => {
                    let score =
                        baseline::anomaly_score(*trace, fitted.mean, fitted.stdev, sensitivity);
                    scored_result(item, *trace, score)
                }
                ItemOutcome::Rejected { reasons } => rejected_result(item, reasons),
            })
            .collect();

        Ok((BaselineSummary::Empirical(fitted), results))
    }

    fn score_calibrated(&self, items: &[PreparedItem], sensitivity: f64) -> Vec<ItemResult> {
        items
            .iter()
            .map(|item| match &item.outcome {
                ItemOutcome::Scored { trace } => {
                    let reference = baseline::expected_trace(item.bit_length);
                    let deviation = baseline::expected_deviation(item.bit_length);
                    let score = baseline::anomaly_score(*trace, reference, deviation, sensitivity);
                    scored_result(item, *trace, score)
                }
                ItemOutcome::Rejected { reasons } => rejected_result(item, reasons),
            })
            .collect()
    }
}

fn scored_result(item: &PreparedItem, trace: f64, score: f64) -> ItemResult {
    let classification = classify::classify(score);
    item_result(item, Some(trace), Some(score), &classification, &[])
}

fn rejected_result(item: &PreparedItem, reasons: &[&'static str]) -> ItemResult {
    let classification = classify::rejected();
    item_result(item, None, None, &classification, reasons)
}

fn item_result(
    item: &PreparedItem,
    trace: Option<f64>,
    score: Option<f64>,
    classification: &Classification,
    reasons: &[&'static str],
) -> ItemResult {
    ItemResult {
        number: item.number.clone(),
        bit_length: item.bit_length,
        trace,
        score,
        label: classification.label,
        note: classification.note.to_string(),
        reasons: reasons.iter().map(|r| r.to_string()).collect(),
        summary: classify::summary_line(&item.number, classification),
    }
}
