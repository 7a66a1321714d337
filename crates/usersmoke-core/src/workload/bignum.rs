//! Arbitrary-precision arithmetic workload.
//!
//! Two operations: the bit length of 2^n (exercises limb allocation and
//! shifting), and π to a fixed number of decimal digits via Machin's formula
//! evaluated in scaled integer arithmetic (long division/multiplication
//! chains over many limbs). Both have exact expected answers.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// Extra scale digits carried so series truncation cannot disturb the
/// requested prefix.
const GUARD_DIGITS: usize = 10;

/// Bit length of 2^exp; must be exp + 1.
#[must_use]
pub fn pow2_bit_length(exp: usize) -> u64 {
    (BigUint::one() << exp).bits()
}

/// π rendered as `3.` followed by `digits` decimal digits (truncated, not
/// rounded), computed as 16·atan(1/5) − 4·atan(1/239).
#[must_use]
pub fn pi_digits(digits: usize) -> String {
    let scale = num_traits::pow(BigInt::from(10), digits + GUARD_DIGITS);
    let pi = arctan_recip(5, &scale) * BigInt::from(16) - arctan_recip(239, &scale) * BigInt::from(4);
    let text = pi.to_string();
    format!("{}.{}", &text[..1], &text[1..=digits])
}

/// atan(1/x) scaled by `scale`, alternating Gregory series in truncated
/// integer arithmetic. Converges quickly for x >= 5.
fn arctan_recip(x: u64, scale: &BigInt) -> BigInt {
    let x_squared = BigInt::from(x * x);
    let mut power = scale.clone() / x;
    let mut total = power.clone();
    let mut k = 1u64;
    loop {
        power = power / &x_squared;
        if power.is_zero() {
            break;
        }
        let term = power.clone() / (2 * k + 1);
        if k % 2 == 1 {
            total -= term;
        } else {
            total += term;
        }
        k += 1;
    }
    total
}
