//! Sanity filter (calibrated mode only)
//!
//! Pre-scoring plausibility checks for the claimed modulus-size domain.
//! Any triggered reason short-circuits the item into the fixed rejection
//! classification; the item keeps its batch position but is never scored.

use super::descriptor::StructuralDescriptor;

/// Bit-length floor for anything claiming to be a real modulus.
pub const MIN_MODULUS_BITS: u64 = 1024;
/// Floor on normalized decimal-digit entropy.
pub const MIN_DECIMAL_ENTROPY: f64 = 0.35;
/// Ceiling on any single digit's frequency.
pub const MAX_DIGIT_FREQUENCY: f64 = 0.5;
/// Minimum distinct decimal digits.
pub const MIN_DISTINCT_DIGITS: u32 = 3;

/// Machine-readable reasons attached to a rejection.
pub mod reason {
    pub const INSUFFICIENT_BIT_LENGTH: &str = "insufficient_bit_length";
    pub const LOW_DECIMAL_ENTROPY: &str = "low_decimal_entropy";
    pub const DIGIT_FREQUENCY_CEILING: &str = "digit_frequency_ceiling";
    pub const INSUFFICIENT_DIGIT_DIVERSITY: &str = "insufficient_digit_diversity";
    pub const ALL_NINES: &str = "all_nines";
}

/// Run every check and return the triggered reasons; empty means the item
/// proceeds to scoring.
pub fn check(descriptor: &StructuralDescriptor, decimal: &str) -> Vec<&'static str> {
    let mut reasons = Vec::new();

    if descriptor.bit_length < MIN_MODULUS_BITS {
        reasons.push(reason::INSUFFICIENT_BIT_LENGTH);
    }
    if descriptor.decimal_entropy < MIN_DECIMAL_ENTROPY {
        reasons.push(reason::LOW_DECIMAL_ENTROPY);
    }
    if max_digit_frequency(decimal) > MAX_DIGIT_FREQUENCY {
        reasons.push(reason::DIGIT_FREQUENCY_CEILING);
    }
    if (descriptor.digit_diversity * 10.0).round() < MIN_DISTINCT_DIGITS as f64 {
        reasons.push(reason::INSUFFICIENT_DIGIT_DIVERSITY);
    }
    if !decimal.is_empty() && decimal.bytes().all(|b| b == b'9') {
        reasons.push(reason::ALL_NINES);
    }

    reasons
}

fn max_digit_frequency(decimal: &str) -> f64 {
    let mut counts = [0usize; 10];
    let mut total = 0usize;
    for b in decimal.bytes() {
        if b.is_ascii_digit() {
            counts[(b - b'0') as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    counts.iter().copied().max().unwrap_or(0) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::descriptor;
    use num_bigint::BigUint;

    fn descriptor_for(decimal: &str) -> StructuralDescriptor {
        let n = BigUint::parse_bytes(decimal.as_bytes(), 10).unwrap();
        descriptor::map(&n, &[3, 5, 7, 11, 13]).unwrap()
    }

    #[test]
    fn test_all_nines_rejection() {
        let decimal = "9999999999999999999999999999";
        let d = descriptor_for(decimal);
        let reasons = check(&d, decimal);

        assert!(reasons.contains(&reason::INSUFFICIENT_BIT_LENGTH));
        assert!(reasons.contains(&reason::ALL_NINES));
        assert!(reasons.contains(&reason::LOW_DECIMAL_ENTROPY));
        assert!(reasons.contains(&reason::DIGIT_FREQUENCY_CEILING));
        assert!(reasons.contains(&reason::INSUFFICIENT_DIGIT_DIVERSITY));
    }

    #[test]
    fn test_short_but_diverse_integer_still_fails_bit_floor() {
        // varied 40-digit integer, far below 1024 bits
        let decimal = "1029384756102938475610293847561029384756";
        let d = descriptor_for(decimal);
        let reasons = check(&d, decimal);
        assert_eq!(reasons, vec![reason::INSUFFICIENT_BIT_LENGTH]);
    }

    #[test]
    fn test_large_diverse_integer_passes() {
        // 1024-bit-scale integer with well-mixed digits: repeat a varied
        // block out to ~310 digits
        let block = "1029384756";
        let decimal: String = std::iter::repeat(block).take(31).collect();
        let d = descriptor_for(&decimal);
        assert!(d.bit_length >= MIN_MODULUS_BITS);
        assert!(check(&d, &decimal).is_empty());
    }

    #[test]
    fn test_digit_frequency_ceiling() {
        assert!(max_digit_frequency("111119") > MAX_DIGIT_FREQUENCY);
        assert!(max_digit_frequency("1234567890") < MAX_DIGIT_FREQUENCY);
    }
}
