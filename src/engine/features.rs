//! Feature operator
//!
//! Reduces a structural descriptor to the scalar feature vector the trace
//! extractor consumes. Pure arithmetic, no I/O.

use std::collections::BTreeMap;

use serde::Serialize;

use super::descriptor::StructuralDescriptor;

/// Guard against division by zero in ratio features.
pub const EPSILON: f64 = 1e-12;

/// Scalar features derived from one structural descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
    pub mean: f64,
    pub stdev: f64,
    /// Shannon entropy of the residue value distribution, normalized by
    /// log2(modulus count).
    pub entropy: f64,
    /// Population stdev of absolute consecutive residue differences.
    pub symmetry: f64,
    /// stdev / (mean + epsilon).
    pub dispersion: f64,
    /// ln(n) * ln(ln(n) + 1), the magnitude term the calibrated weights use.
    pub scale_curve: f64,
    pub bit_shortfall: f64,
    pub decimal_entropy_penalty: f64,
    pub digit_diversity_penalty: f64,
}

/// Reduce a descriptor to its feature vector.
pub fn reduce(descriptor: &StructuralDescriptor, target_bits: u64) -> FeatureVector {
    let residues: Vec<f64> = descriptor.residues.iter().map(|&r| r as f64).collect();

    let mean = sample_mean(&residues);
    let stdev = population_stdev(&residues, mean);

    let diffs: Vec<f64> = descriptor
        .residues
        .windows(2)
        .map(|w| (w[0] as f64 - w[1] as f64).abs())
        .collect();
    let symmetry = if diffs.is_empty() {
        0.0
    } else {
        population_stdev(&diffs, sample_mean(&diffs))
    };

    let shortfall = target_bits.saturating_sub(descriptor.bit_length) as f64;

    FeatureVector {
        mean,
        stdev,
        entropy: residue_entropy(&descriptor.residues),
        symmetry,
        dispersion: stdev / (mean + EPSILON),
        scale_curve: descriptor.ln_scale * (descriptor.ln_scale + 1.0).ln(),
        bit_shortfall: shortfall / target_bits as f64,
        decimal_entropy_penalty: 1.0 - descriptor.decimal_entropy,
        digit_diversity_penalty: 1.0 - descriptor.digit_diversity,
    }
}

fn sample_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n, not n - 1).
pub fn population_stdev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Shannon entropy over residue values (not positions), normalized by
/// log2(count). With a single modulus the normalizer would be log2(1) = 0,
/// so normalize by 1.0 instead. Counts go through a BTreeMap so the float
/// terms are summed in a fixed order; float addition is not associative and
/// hashed iteration order would perturb the low bits between calls.
fn residue_entropy(residues: &[u64]) -> f64 {
    if residues.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for &r in residues {
        *counts.entry(r).or_insert(0) += 1;
    }

    let total = residues.len() as f64;
    let entropy: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum();

    let normalizer = if residues.len() > 1 {
        (residues.len() as f64).log2()
    } else {
        1.0
    };
    entropy / normalizer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(residues: Vec<u64>) -> StructuralDescriptor {
        StructuralDescriptor {
            residues,
            bit_length: 64,
            ln_scale: 44.0,
            decimal_entropy: 0.9,
            digit_diversity: 0.8,
        }
    }

    #[test]
    fn test_mean_and_stdev() {
        let f = reduce(&descriptor(vec![2, 4, 6]), 2048);
        assert!((f.mean - 4.0).abs() < 1e-12);
        // population stdev of [2,4,6] is sqrt(8/3)
        assert!((f.stdev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_bounds() {
        // all distinct: maximal entropy, exactly 1 after normalization
        let f = reduce(&descriptor(vec![1, 2, 3, 4, 5, 6, 7, 8]), 2048);
        assert!((f.entropy - 1.0).abs() < 1e-12);

        // all equal: zero entropy
        let f = reduce(&descriptor(vec![3, 3, 3, 3]), 2048);
        assert_eq!(f.entropy, 0.0);

        // mixed: strictly inside [0, 1]
        let f = reduce(&descriptor(vec![1, 1, 2, 3]), 2048);
        assert!(f.entropy > 0.0 && f.entropy < 1.0);
    }

    #[test]
    fn test_entropy_is_bitwise_stable_under_collisions() {
        // colliding residue values with unequal multiplicities make the
        // summation order observable in the low bits
        let d = descriptor(vec![6, 2, 6, 9, 2, 12, 6, 5, 2, 4]);
        let first = reduce(&d, 2048).entropy;
        for _ in 0..32 {
            assert_eq!(reduce(&d, 2048).entropy.to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_single_residue_entropy_guard() {
        let f = reduce(&descriptor(vec![5]), 2048);
        assert_eq!(f.entropy, 0.0);
        assert!(f.entropy.is_finite());
    }

    #[test]
    fn test_symmetry_needs_two_residues() {
        let f = reduce(&descriptor(vec![5]), 2048);
        assert_eq!(f.symmetry, 0.0);

        // evenly spaced residues have constant differences, stdev 0
        let f = reduce(&descriptor(vec![1, 4, 7, 10]), 2048);
        assert_eq!(f.symmetry, 0.0);
    }

    #[test]
    fn test_bit_shortfall_penalty() {
        let mut d = descriptor(vec![1, 2, 3]);
        d.bit_length = 1024;
        let f = reduce(&d, 2048);
        assert!((f.bit_shortfall - 0.5).abs() < 1e-12);

        d.bit_length = 4096;
        let f = reduce(&d, 2048);
        assert_eq!(f.bit_shortfall, 0.0);
    }

    #[test]
    fn test_dispersion_zero_mean_guard() {
        let f = reduce(&descriptor(vec![0, 0, 0]), 2048);
        assert_eq!(f.dispersion, 0.0);
    }
}
