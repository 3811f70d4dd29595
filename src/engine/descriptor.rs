//! Residue mapper
//!
//! Turns a normalized integer into its structural descriptor: residue vector
//! over the fixed small-prime moduli, bit length, natural-log scale, and
//! decimal-digit statistics.

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use serde::Serialize;

use super::EngineError;

/// Default modulus list: the first 15 odd primes.
pub const DEFAULT_MODULI: [u64; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Structural fingerprint of a normalized integer.
#[derive(Debug, Clone, Serialize)]
pub struct StructuralDescriptor {
    pub residues: Vec<u64>,
    pub bit_length: u64,
    pub ln_scale: f64,
    /// Shannon entropy of the decimal digits, normalized by log2(10).
    pub decimal_entropy: f64,
    /// Distinct decimal digits used / 10.
    pub digit_diversity: f64,
}

/// Strip every factor of two. This is the only decomposition the engine
/// performs; it must never divide by any other prime.
pub fn normalize(n: &BigUint) -> Result<BigUint, EngineError> {
    if *n <= BigUint::one() {
        return Err(EngineError::InputValidation(format!(
            "input must be greater than 1, got {}",
            n
        )));
    }
    let shift = n.trailing_zeros().unwrap_or(0);
    let odd = n >> shift as usize;
    if odd <= BigUint::one() {
        return Err(EngineError::InputValidation(format!(
            "input {} is a power of two and normalizes to 1",
            n
        )));
    }
    Ok(odd)
}

/// Map a normalized integer to its structural descriptor.
pub fn map(n: &BigUint, moduli: &[u64]) -> Result<StructuralDescriptor, EngineError> {
    if *n <= BigUint::one() {
        return Err(EngineError::InputValidation(
            "descriptor requires a normalized integer greater than 1".to_string(),
        ));
    }

    let residues: Vec<u64> = moduli
        .iter()
        .map(|&m| {
            // residue < m <= u64::MAX, so the conversion cannot fail
            (n % m).to_u64().unwrap_or(0)
        })
        .collect();

    let digits = n.to_str_radix(10);
    let (decimal_entropy, digit_diversity) = digit_statistics(&digits);

    Ok(StructuralDescriptor {
        residues,
        bit_length: n.bits(),
        ln_scale: ln_big(n),
        decimal_entropy,
        digit_diversity,
    })
}

/// Natural log of an arbitrary-size integer without overflowing f64:
/// take the top 53 bits as mantissa and add the shifted-out bits as
/// multiples of ln 2.
pub fn ln_big(n: &BigUint) -> f64 {
    if n.is_zero() {
        return f64::NEG_INFINITY;
    }
    let bits = n.bits();
    if bits <= 53 {
        return n.to_f64().unwrap_or(0.0).ln();
    }
    let shift = bits - 53;
    let head = (n >> shift as usize).to_f64().unwrap_or(0.0);
    head.ln() + shift as f64 * std::f64::consts::LN_2
}

/// Normalized Shannon entropy over decimal digits and the digit-diversity
/// ratio, both over the base-10 representation.
fn digit_statistics(digits: &str) -> (f64, f64) {
    let mut counts = [0usize; 10];
    let mut total = 0usize;
    for b in digits.bytes() {
        if b.is_ascii_digit() {
            counts[(b - b'0') as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return (0.0, 0.0);
    }

    let mut entropy = 0.0f64;
    let mut distinct = 0usize;
    for &c in &counts {
        if c > 0 {
            distinct += 1;
            let p = c as f64 / total as f64;
            entropy -= p * p.log2();
        }
    }

    (entropy / 10f64.log2(), distinct as f64 / 10.0)
}
