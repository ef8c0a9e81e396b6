//! Arbitrary-precision modular arithmetic and number-theoretic primitives
//! (spec.md §4.1, `BigModArith`).
//!
//! Everything here is expressed over [`num_bigint::BigInt`] /
//! [`num_bigint::BigUint`], the canonical arbitrary-precision facility in
//! the Rust ecosystem — no operation below assumes a fixed machine-word
//! width, matching spec.md §9's explicit constraint.

use std::collections::BTreeMap;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use rand::RngCore;

use crate::error::{Error, Result};

/// Maximum candidates tried by [`random_prime`] before giving up. Primes are
/// dense enough (density ~ 1/ln(2^n)) that this is never hit in practice for
/// the bit ranges this library uses (Benaloh and friends excepted, which
/// intentionally pick small primes).
const PRIME_SEARCH_BUDGET: u32 = 100_000;

/// Number of Miller-Rabin rounds run by [`is_probable_prime`]. Each round
/// roughly halves the false-positive probability for a random composite;
/// 40 rounds gives a soundness error below 2^-80, comfortably past the
/// "≥ 64-bit confidence" spec.md §4.1 asks for.
const MILLER_RABIN_ROUNDS: u32 = 40;

/// `base^exp mod m`, supporting negative `exp` by routing through
/// [`mod_inv`] (`base^-1` raised to `|exp|`), exactly as spec.md §4.1
/// requires.
pub fn mod_pow(base: &BigInt, exp: &BigInt, m: &BigInt) -> Result<BigInt> {
    if m.is_zero() {
        return Err(Error::NoModularInverse {
            value: base.to_string(),
            modulus: m.to_string(),
            gcd: "0".to_string(),
        });
    }
    if exp.is_negative() {
        let inv = mod_inv(base, m)?;
        return mod_pow(&inv, &(-exp), m);
    }
    let (sign, base_bytes) = base.to_bytes_be();
    let base_u = BigUint::from_bytes_be(&base_bytes);
    let base_u = if sign == Sign::Minus {
        let m_u = m.magnitude();
        (m_u - (&base_u % m_u)) % m_u
    } else {
        base_u
    };
    let (_, exp_bytes) = exp.to_bytes_be();
    let exp_u = BigUint::from_bytes_be(&exp_bytes);
    let m_u = m.magnitude().clone();
    let result = base_u.modpow(&exp_u, &m_u);
    Ok(BigInt::from_biguint(Sign::Plus, result))
}

/// Modular inverse of `a` mod `m` via the extended Euclidean algorithm.
/// Fails with [`Error::NoModularInverse`] when `gcd(a, m) != 1`.
pub fn mod_inv(a: &BigInt, m: &BigInt) -> Result<BigInt> {
    let (g, x, _y) = extended_gcd(a, m);
    if g != BigInt::one() && g != -BigInt::one() {
        return Err(Error::NoModularInverse {
            value: a.to_string(),
            modulus: m.to_string(),
            gcd: g.to_string(),
        });
    }
    let m_abs = m.abs();
    let result = ((x % &m_abs) + &m_abs) % &m_abs;
    Ok(result)
}

/// `gcd(a, b)`, always non-negative.
pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b).abs()
}

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`.
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut old_r, mut r) = (a.clone(), b.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    let (mut old_t, mut t) = (BigInt::zero(), BigInt::one());

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let tmp_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, tmp_r);
        let tmp_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, tmp_s);
        let tmp_t = &old_t - &quotient * &t;
        old_t = std::mem::replace(&mut t, tmp_t);
    }
    (old_r, old_s, old_t)
}

/// Jacobi symbol `(a/n)` for odd positive `n`. Returns `-1`, `0` or `1`.
pub fn jacobi(a: &BigInt, n: &BigInt) -> i8 {
    assert!(n.is_positive() && n.is_odd(), "jacobi requires odd positive n");
    let mut a = a.mod_floor(n);
    let mut n = n.clone();
    let mut result: i8 = 1;

    while !a.is_zero() {
        while a.is_even() {
            a /= 2;
            let r = n.mod_floor(&BigInt::from(8));
            if r == BigInt::from(3) || r == BigInt::from(5) {
                result = -result;
            }
        }
        std::mem::swap(&mut a, &mut n);
        if a.mod_floor(&BigInt::from(4)) == BigInt::from(3)
            && n.mod_floor(&BigInt::from(4)) == BigInt::from(3)
        {
            result = -result;
        }
        a = a.mod_floor(&n);
    }

    if n.is_one() {
        result
    } else {
        0
    }
}

/// Miller-Rabin primality test, run for [`MILLER_RABIN_ROUNDS`] rounds.
pub fn is_probable_prime(n: &BigUint, rng: &mut impl RngCore) -> bool {
    if *n < BigUint::from(2u8) {
        return false;
    }
    for p in [2u8, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31] {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - BigUint::one();
    let mut d = n_minus_one.clone();
    let mut r = 0u32;
    while d.is_even() {
        d /= 2u8;
        r += 1;
    }

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = random_below(n, rng).max(BigUint::from(2u8));
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&BigUint::from(2u8), n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Uniform random value in `[0, n)`.
fn random_below(n: &BigUint, rng: &mut impl RngCore) -> BigUint {
    let bits = n.bits();
    let bytes = bits.div_ceil(8) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf);
        if candidate < *n {
            return candidate;
        }
    }
}

/// Draws a uniformly random odd candidate with bit length in `[low, high)`
/// and returns the first one to pass [`is_probable_prime`].
pub fn random_prime(low: u32, high: u32, rng: &mut impl RngCore) -> Result<BigUint> {
    assert!(low < high, "empty bit-length range");
    for _ in 0..PRIME_SEARCH_BUDGET {
        let bits = low + (rng.next_u32() % (high - low));
        let bytes = bits.div_ceil(8) as usize;
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let mut candidate = BigUint::from_bytes_be(&buf);
        // Force the requested bit length and oddness.
        let top_bit = bits - 1;
        candidate.set_bit(top_bit as u64, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, rng) {
            return Ok(candidate);
        }
    }
    Err(Error::PrimeSearchExhausted {
        low,
        high,
        tries: PRIME_SEARCH_BUDGET,
    })
}

/// Smallest prime strictly greater than `n`. Used by Benaloh/Naccache-Stern
/// keygen's `nextprime(plaintext_limit)` path.
pub fn next_prime(n: &BigUint, rng: &mut impl RngCore) -> BigUint {
    let mut candidate = n + BigUint::one();
    if candidate.is_even() {
        candidate += BigUint::one();
    }
    while !is_probable_prime(&candidate, rng) {
        candidate += BigUint::from(2u8);
    }
    candidate
}

/// Trial-division factorisation of small integers (spec.md: "used only on
/// small numbers ≤ a few thousand", e.g. Benaloh's `r` or Naccache-Stern's
/// small-prime halves). Returns prime → exponent.
pub fn factorint(n: &BigUint) -> BTreeMap<BigUint, u32> {
    let mut factors = BTreeMap::new();
    let mut n = n.clone();
    let mut p = BigUint::from(2u8);
    while &p * &p <= n {
        let mut exp = 0u32;
        while (&n % &p).is_zero() {
            n /= &p;
            exp += 1;
        }
        if exp > 0 {
            factors.insert(p.clone(), exp);
        }
        p += BigUint::one();
    }
    if n > BigUint::one() {
        *factors.entry(n).or_insert(0) += 1;
    }
    factors
}

/// Chinese Remainder Theorem: given pairwise-coprime `(remainder, modulus)`
/// pairs, returns the unique solution mod the product of the moduli.
pub fn solve_crt(pairs: &[(BigInt, BigInt)]) -> Result<BigInt> {
    assert!(!pairs.is_empty(), "solve_crt requires at least one congruence");
    let mut x = pairs[0].0.mod_floor(&pairs[0].1);
    let mut m = pairs[0].1.clone();
    for (r, n) in &pairs[1..] {
        let inv = mod_inv(&m, n)?;
        let diff = (r - &x).mod_floor(n);
        let t = (diff * inv).mod_floor(n);
        x += &m * t;
        m *= n;
        x = x.mod_floor(&m);
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    #[test]
    fn mod_pow_matches_known_value() {
        let base = BigInt::from(4u8);
        let exp = BigInt::from(13u8);
        let m = BigInt::from(497u16);
        assert_eq!(mod_pow(&base, &exp, &m).unwrap(), BigInt::from(445u16));
    }

    #[test]
    fn mod_pow_negative_exponent_round_trips() {
        let base = BigInt::from(7u8);
        let m = BigInt::from(101u8);
        let positive = mod_pow(&base, &BigInt::from(3u8), &m).unwrap();
        let inverse = mod_pow(&base, &BigInt::from(-3i8), &m).unwrap();
        let product = (&positive * &inverse).mod_floor(&m);
        assert_eq!(product, BigInt::one());
    }

    #[test]
    fn mod_inv_fails_when_not_coprime() {
        assert!(mod_inv(&BigInt::from(4u8), &BigInt::from(8u8)).is_err());
    }

    #[test]
    fn gcd_matches_euclid() {
        assert_eq!(gcd(&BigInt::from(48u8), &BigInt::from(18u8)), BigInt::from(6u8));
    }

    #[test]
    fn is_probable_prime_flags_small_primes_and_composites() {
        let mut r = rng();
        assert!(is_probable_prime(&BigUint::from(104729u32), &mut r));
        assert!(!is_probable_prime(&BigUint::from(104730u32), &mut r));
        assert!(!is_probable_prime(&BigUint::from(1u8), &mut r));
    }

    #[test]
    fn random_prime_has_requested_bit_length() {
        let mut r = rng();
        let p = random_prime(16, 24, &mut r).unwrap();
        assert!(p.bits() >= 16 && p.bits() < 24);
        assert!(is_probable_prime(&p, &mut r));
    }

    #[test]
    fn factorint_of_small_composite() {
        let factors = factorint(&BigUint::from(360u16));
        let mut expect = BTreeMap::new();
        expect.insert(BigUint::from(2u8), 3);
        expect.insert(BigUint::from(3u8), 2);
        expect.insert(BigUint::from(5u8), 1);
        assert_eq!(factors, expect);
    }

    #[test]
    fn jacobi_matches_known_values() {
        assert_eq!(jacobi(&BigInt::from(1001u32), &BigInt::from(9907u32)), -1);
        assert_eq!(jacobi(&BigInt::from(19u8), &BigInt::from(45u8)), 1);
    }

    #[test]
    fn solve_crt_recovers_known_solution() {
        let pairs = vec![
            (BigInt::from(2u8), BigInt::from(3u8)),
            (BigInt::from(3u8), BigInt::from(5u8)),
            (BigInt::from(2u8), BigInt::from(7u8)),
        ];
        let x = solve_crt(&pairs).unwrap();
        assert_eq!(x, BigInt::from(23u8));
    }
}
