//! Trace extractor
//!
//! Collapses a feature vector into the single scalar trace. The extraction
//! is a branch-free dot product so a given feature vector always yields the
//! same trace regardless of its batch peers.

use super::features::FeatureVector;

/// Fixed per-mode weights over the feature vector.
#[derive(Debug, Clone, Copy)]
pub struct TraceWeights {
    pub mean: f64,
    pub stdev: f64,
    pub entropy: f64,
    pub symmetry: f64,
    pub dispersion: f64,
    pub scale_curve: f64,
    pub bit_shortfall: f64,
    pub decimal_entropy_penalty: f64,
    pub digit_diversity_penalty: f64,
}

/// Batch-relative mode: residue statistics dominate, magnitude and penalty
/// terms are zeroed.
pub const EMPIRICAL_WEIGHTS: TraceWeights = TraceWeights {
    mean: 1.0,
    stdev: 0.5,
    entropy: 4.0,
    symmetry: 0.25,
    dispersion: 1.5,
    scale_curve: 0.0,
    bit_shortfall: 0.0,
    decimal_entropy_penalty: 0.0,
    digit_diversity_penalty: 0.0,
};

/// Calibrated mode: the trace tracks the closed-form magnitude curve, with
/// penalty terms pushing constructed inputs off it.
pub const CALIBRATED_WEIGHTS: TraceWeights = TraceWeights {
    mean: 0.0,
    stdev: 0.0,
    entropy: 1.5,
    symmetry: 0.0,
    dispersion: 0.0,
    scale_curve: 1.0,
    bit_shortfall: 40.0,
    decimal_entropy_penalty: 25.0,
    digit_diversity_penalty: 15.0,
};

/// Weighted sum of the feature fields.
pub fn extract(features: &FeatureVector, weights: &TraceWeights) -> f64 {
    weights.mean * features.mean
        + weights.stdev * features.stdev
        + weights.entropy * features.entropy
        + weights.symmetry * features.symmetry
        + weights.dispersion * features.dispersion
        + weights.scale_curve * features.scale_curve
        + weights.bit_shortfall * features.bit_shortfall
        + weights.decimal_entropy_penalty * features.decimal_entropy_penalty
        + weights.digit_diversity_penalty * features.digit_diversity_penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector {
            mean: 10.0,
            stdev: 4.0,
            entropy: 0.9,
            symmetry: 2.0,
            dispersion: 0.4,
            scale_curve: 120.0,
            bit_shortfall: 0.25,
            decimal_entropy_penalty: 0.05,
            digit_diversity_penalty: 0.1,
        }
    }

    #[test]
    fn test_extract_is_a_plain_dot_product() {
        let f = features();
        let t = extract(&f, &EMPIRICAL_WEIGHTS);
        let by_hand = 1.0 * 10.0 + 0.5 * 4.0 + 4.0 * 0.9 + 0.25 * 2.0 + 1.5 * 0.4;
        assert!((t - by_hand).abs() < 1e-12);
    }

    #[test]
    fn test_extract_is_deterministic() {
        let f = features();
        let a = extract(&f, &CALIBRATED_WEIGHTS);
        let b = extract(&f, &CALIBRATED_WEIGHTS);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_calibrated_weights_track_the_scale_curve() {
        // with zero penalties and zero entropy the calibrated trace is the
        // magnitude term itself
        let f = FeatureVector {
            mean: 13.0,
            stdev: 9.0,
            entropy: 0.0,
            symmetry: 1.0,
            dispersion: 0.7,
            scale_curve: 10_000.0,
            bit_shortfall: 0.0,
            decimal_entropy_penalty: 0.0,
            digit_diversity_penalty: 0.0,
        };
        assert!((extract(&f, &CALIBRATED_WEIGHTS) - 10_000.0).abs() < 1e-9);
    }
}
