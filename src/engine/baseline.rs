//! Baseline / calibration engine
//!
//! Two interchangeable strategies produce the reference a trace is scored
//! against: an empirical baseline fitted to the batch, or a calibrated
//! closed-form curve parameterized by bit length. A given audit call uses
//! exactly one of the two.

use serde::{Deserialize, Serialize};

use super::features::{population_stdev, EPSILON};

/// Multiplier on sqrt(bit_length) for the calibrated expected deviation.
pub const CALIBRATED_DEVIATION_COEFFICIENT: f64 = 0.6;

/// Which baseline strategy an engine instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BaselineMode {
    #[default]
    Empirical,
    Calibrated,
}

/// Empirical baseline over the traces of the current batch.
#[derive(Debug, Clone, Serialize)]
pub struct EmpiricalBaseline {
    pub mean: f64,
    pub stdev: f64,
    pub min: f64,
    pub max: f64,
    pub sample_count: usize,
}

impl EmpiricalBaseline {
    /// Fit mean, population stdev, min and max. Requires at least one trace;
    /// a single trace fits with stdev 0 and the epsilon guard in scoring
    /// keeps the resulting score defined.
    pub fn fit(traces: &[f64]) -> Option<Self> {
        if traces.is_empty() {
            return None;
        }
        let mean = traces.iter().sum::<f64>() / traces.len() as f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &t in traces {
            min = min.min(t);
            max = max.max(t);
        }
        Some(Self {
            mean,
            stdev: population_stdev(traces, mean),
            min,
            max,
            sample_count: traces.len(),
        })
    }
}

/// Expected trace for a b-bit integer, evaluated at the expected magnitude
/// of that bit length: ln_hat = (b - 0.5) * ln 2, curve = ln_hat * ln(ln_hat + 1).
pub fn expected_trace(bit_length: u64) -> f64 {
    let ln_hat = (bit_length as f64 - 0.5) * std::f64::consts::LN_2;
    ln_hat * (ln_hat + 1.0).ln()
}

/// Expected deviation for a b-bit integer, proportional to sqrt(b).
pub fn expected_deviation(bit_length: u64) -> f64 {
    CALIBRATED_DEVIATION_COEFFICIENT * (bit_length as f64).sqrt()
}

/// Normalized deviation of a trace from its reference. The epsilon guard
/// keeps a zero deviation (single-item batch) from dividing by zero.
pub fn anomaly_score(trace: f64, reference: f64, deviation: f64, sensitivity: f64) -> f64 {
    (trace - reference).abs() / (deviation + EPSILON) * sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_requires_a_trace() {
        assert!(EmpiricalBaseline::fit(&[]).is_none());
    }

    #[test]
    fn test_fit_single_trace() {
        let b = EmpiricalBaseline::fit(&[7.5]).unwrap();
        assert_eq!(b.mean, 7.5);
        assert_eq!(b.stdev, 0.0);
        assert_eq!(b.min, 7.5);
        assert_eq!(b.max, 7.5);
        assert_eq!(b.sample_count, 1);
    }

    #[test]
    fn test_fit_batch_statistics() {
        let b = EmpiricalBaseline::fit(&[1.0, 2.0, 3.0]).unwrap();
        assert!((b.mean - 2.0).abs() < 1e-12);
        assert!((b.stdev - (2.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(b.min, 1.0);
        assert_eq!(b.max, 3.0);
    }

    #[test]
    fn test_single_trace_scores_zero_under_epsilon_guard() {
        let b = EmpiricalBaseline::fit(&[7.5]).unwrap();
        let score = anomaly_score(7.5, b.mean, b.stdev, 1.0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_anomaly_score_scales_with_sensitivity() {
        let base = anomaly_score(10.0, 4.0, 2.0, 1.0);
        let boosted = anomaly_score(10.0, 4.0, 2.0, 2.5);
        assert!((boosted - base * 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_expected_trace_grows_with_bit_length() {
        assert!(expected_trace(2048) > expected_trace(1024));
        assert!(expected_deviation(2048) > expected_deviation(1024));
    }

    #[test]
    fn test_expected_trace_matches_closed_form() {
        let ln_hat = 2047.5 * std::f64::consts::LN_2;
        let expected = ln_hat * (ln_hat + 1.0).ln();
        assert!((expected_trace(2048) - expected).abs() < 1e-9);
    }
}
