//! Carry-less polynomial arithmetic over GF(2) (spec.md §4.2,
//! `BinaryFieldArith`). Bit `i` of a [`BigUint`] is the coefficient of `x^i`.
//! Used only by the Koblitz variant of [`crate::curve::CurveEngine`].

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Error, Result};

/// `a XOR b`, i.e. GF(2)[x] addition (and subtraction — they're the same
/// operation in characteristic 2).
pub fn add(a: &BigUint, b: &BigUint) -> BigUint {
    a ^ b
}

/// Carry-less (polynomial) multiplication: `sum_i a_i * (b << i)` with XOR
/// standing in for addition.
pub fn multiply(a: &BigUint, b: &BigUint) -> BigUint {
    let mut result = BigUint::zero();
    for i in 0..b.bits() {
        if b.bit(i) {
            result ^= a << i;
        }
    }
    result
}

/// `a^2` over GF(2)[x]: squaring a polynomial interleaves a zero bit between
/// every coefficient (cross terms vanish because `2*a_i*a_j = 0`).
pub fn square(a: &BigUint) -> BigUint {
    let mut result = BigUint::zero();
    for i in 0..a.bits() {
        if a.bit(i) {
            result.set_bit(2 * i, true);
        }
    }
    result
}

/// Reduces `a` modulo the irreducible polynomial `m` by repeated
/// shift-and-XOR until `a`'s bit length is below `m`'s.
pub fn modulo(a: &BigUint, m: &BigUint) -> BigUint {
    let mut a = a.clone();
    let m_bits = m.bits();
    while a.bits() >= m_bits {
        let shift = a.bits() - m_bits;
        a ^= m << shift;
    }
    a
}

/// Quotient of the same shift-and-XOR reduction [`modulo`] performs.
pub fn div(a: &BigUint, m: &BigUint) -> BigUint {
    let mut a = a.clone();
    let m_bits = m.bits();
    let mut quotient = BigUint::zero();
    while a.bits() >= m_bits {
        let shift = a.bits() - m_bits;
        quotient.set_bit(shift, true);
        a ^= m << shift;
    }
    quotient
}

/// Modular inverse of `a` mod the irreducible polynomial `m`, via the
/// extended polynomial Euclidean algorithm.
pub fn inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    let (mut old_r, mut r) = (a.clone(), m.clone());
    let (mut old_s, mut s) = (BigUint::one(), BigUint::zero());

    while !r.is_zero() {
        let q = div(&old_r, &r);
        let new_r = add(&old_r, &multiply_mod(&q, &r, m));
        old_r = std::mem::replace(&mut r, new_r);
        let new_s = add(&old_s, &multiply_mod(&q, &s, m));
        old_s = std::mem::replace(&mut s, new_s);
    }

    if old_r != BigUint::one() {
        return Err(Error::NoModularInverse {
            value: a.to_string(),
            modulus: m.to_string(),
            gcd: old_r.to_string(),
        });
    }
    Ok(modulo(&old_s, m))
}

/// `multiply(a, b)` reduced mod `m`. Not part of the spec's public surface
/// but used throughout this module and by `divide`.
fn multiply_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    modulo(&multiply(a, b), m)
}

/// `a / b mod m = (a * inverse(b, m)) mod m`.
pub fn divide(a: &BigUint, b: &BigUint, m: &BigUint) -> Result<BigUint> {
    let inv = inverse(b, m)?;
    Ok(multiply_mod(a, &inv, m))
}

/// Left-to-right square-and-multiply exponentiation, reducing mod `m` after
/// every step.
pub fn pow_mod(a: &BigUint, e: &BigUint, m: &BigUint) -> BigUint {
    if e.is_zero() {
        return modulo(&BigUint::one(), m);
    }
    let mut result = BigUint::one();
    let mut base = modulo(a, m);
    for i in (0..e.bits()).rev() {
        result = multiply_mod(&result, &result, m);
        if e.bit(i) {
            result = multiply_mod(&result, &base, m);
        }
        let _ = &mut base; // base stays fixed; keeps clippy quiet about unused mut
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // GF(2^4) with the standard irreducible x^4 + x + 1 (0b10011).
    const M: u32 = 0b10011;

    fn m() -> BigUint {
        BigUint::from(M)
    }

    #[test]
    fn add_is_xor() {
        assert_eq!(add(&BigUint::from(0b1010u8), &BigUint::from(0b0110u8)), BigUint::from(0b1100u8));
    }

    #[test]
    fn square_interleaves_zero_bits() {
        // x^3 + x + 1 (0b1011) squared is x^6 + x^2 + 1 (0b1000101).
        assert_eq!(square(&BigUint::from(0b1011u8)), BigUint::from(0b1000101u16));
    }

    #[test]
    fn modulo_reduces_below_degree() {
        let a = BigUint::from(0b110101u8); // degree 5
        let r = modulo(&a, &m());
        assert!(r.bits() < m().bits());
    }

    #[test]
    fn div_and_modulo_are_consistent() {
        let a = BigUint::from(0b110101u8);
        let q = div(&a, &m());
        let r = modulo(&a, &m());
        let reconstructed = add(&multiply(&q, &m()), &r);
        assert_eq!(reconstructed, a);
    }

    #[test]
    fn inverse_round_trips() {
        let a = BigUint::from(0b0101u8);
        let inv = inverse(&a, &m()).unwrap();
        let product = multiply_mod(&a, &inv, &m());
        assert_eq!(product, BigUint::one());
    }

    #[test]
    fn pow_mod_matches_repeated_multiplication() {
        let a = BigUint::from(0b0110u8);
        let direct = multiply_mod(&multiply_mod(&a, &a, &m()), &a, &m());
        assert_eq!(pow_mod(&a, &BigUint::from(3u8), &m()), direct);
    }
}
