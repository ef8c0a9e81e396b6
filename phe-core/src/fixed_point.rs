//! Fixed-point encoding of signed/fractional plaintexts into a scheme's
//! plaintext group (spec.md §4.5, `FixedPoint`).

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;

use crate::bigint::mod_inv;
use crate::error::{Error, Result};

/// A plaintext value as it arrives at the Facade boundary, before it is
/// folded into a scheme's plaintext group. Spec.md §9 calls this "dynamic
/// typing of plaintext/ciphertext" and asks for a tagged union at the
/// boundary; this is that union for scalar (non-tensor) values.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// An arbitrary-precision integer, positive, negative or zero.
    Int(BigInt),
    /// An IEEE-754 double. Negative floats are rejected by
    /// [`normalize_input`] (see [`Error::UnsupportedInput`]).
    Float(f64),
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Int(BigInt::from(v))
    }
}

impl From<BigInt> for Numeric {
    fn from(v: BigInt) -> Self {
        Numeric::Int(v)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

/// Number of significant decimal digits `fractionize` keeps when no
/// explicit `precision` is supplied, matching the spec's fallback rule
/// ("number of decimal digits present in the literal"). We cannot recover
/// "what the caller literally typed" from an `f64` at this layer, so the
/// Facade is expected to pass an explicit precision in practice; this
/// constant is the floor used when it doesn't.
pub const DEFAULT_PRECISION: u32 = 5;

/// Splits a non-negative float into `(dividend, divisor)` with
/// `divisor = 10^precision` and `dividend = floor(value * 10^precision) mod
/// m`, using decimal-string formatting rather than floating-point
/// multiplication so that the scaling is exact up to `precision` digits
/// (spec.md's "high-precision decimal multiplication").
pub fn fractionize(value: f64, m: &BigUint, precision: u32) -> Result<(BigUint, BigUint)> {
    if value.is_sign_negative() && value != 0.0 {
        return Err(Error::UnsupportedInput);
    }
    let divisor = BigUint::from(10u8).pow(precision);
    let formatted = format!("{value:.*}", precision as usize);
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), ""));
    let mut digits = String::with_capacity(int_part.len() + frac_part.len());
    digits.push_str(int_part);
    digits.push_str(frac_part);
    let magnitude: BigUint = digits.parse().unwrap_or_else(|_| BigUint::zero());
    let dividend = &magnitude % m;
    Ok((dividend, divisor))
}

/// Maps an arbitrary numeric input into `[0, m)`, per spec.md §4.5's rules:
///
/// - non-negative integers reduce mod `m` directly;
/// - negative integers wrap via modular reduction (two's-complement style);
/// - non-negative floats go through [`fractionize`] and are folded back to
///   a single residue via `dividend * divisor^-1 mod m`;
/// - negative floats are [`Error::UnsupportedInput`] (documented limitation,
///   matching `original_source`, which has no negative-float branch either).
pub fn normalize_input(value: &Numeric, m: &BigUint, precision: u32) -> Result<BigUint> {
    match value {
        Numeric::Int(v) => {
            let m_signed = BigInt::from(m.clone());
            Ok(v.mod_floor(&m_signed).magnitude().clone())
        }
        Numeric::Float(v) => {
            if *v < 0.0 {
                return Err(Error::UnsupportedInput);
            }
            let (dividend, divisor) = fractionize(*v, m, precision)?;
            let divisor_signed = BigInt::from(divisor);
            let m_signed = BigInt::from(m.clone());
            let inv = mod_inv(&divisor_signed, &m_signed)?;
            let dividend_signed = BigInt::from(dividend);
            let result = (dividend_signed * inv).mod_floor(&m_signed);
            Ok(result.magnitude().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_integer_reduces_mod_m() {
        let m = BigUint::from(1000u32);
        let r = normalize_input(&Numeric::from(1234i64), &m, 5).unwrap();
        assert_eq!(r, BigUint::from(234u32));
    }

    #[test]
    fn negative_integer_wraps_modularly() {
        let m = BigUint::from(1000u32);
        let r = normalize_input(&Numeric::from(-1i64), &m, 5).unwrap();
        assert_eq!(r, BigUint::from(999u32));
    }

    #[test]
    fn negative_float_is_unsupported() {
        let m = BigUint::from(1000u32);
        assert!(matches!(
            normalize_input(&Numeric::from(-1.5f64), &m, 5),
            Err(Error::UnsupportedInput)
        ));
    }

    #[test]
    fn fractionize_splits_value_by_precision() {
        let m = BigUint::from(10_000_000u32);
        let (dividend, divisor) = fractionize(3.14, &m, 2).unwrap();
        assert_eq!(dividend, BigUint::from(314u32));
        assert_eq!(divisor, BigUint::from(100u32));
    }
}
