//! [`TensorEncoder`] (spec.md §4.8): turns a slice of [`Numeric`] plaintexts
//! into an [`EncryptedTensor`], one [`Fraction`] per element, sharing a
//! single encrypted divisor across the whole tensor.

use std::sync::Arc;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::Zero;
use phe_core::fixed_point::{fractionize, Numeric};
use phe_core::Reporter;
use phe_schemes::{CiphertextHandle, KeyMaterial, Scheme};
use rand_core::RngCore;

#[cfg(feature = "parallel")]
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rand_chacha::ChaCha20Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::fraction::Fraction;
use crate::tensor::EncryptedTensor;

/// Encrypts and decrypts whole tensors against one fixed scheme, key pair,
/// reporter and fixed-point precision.
pub struct TensorEncoder {
    scheme: Arc<dyn Scheme>,
    keys: Arc<KeyMaterial>,
    reporter: Arc<dyn Reporter>,
    precision: u32,
}

impl TensorEncoder {
    /// Builds an encoder bound to a scheme, key material and precision
    /// (spec.md §4.8's `precision` constructor argument).
    pub fn new(scheme: Arc<dyn Scheme>, keys: Arc<KeyMaterial>, reporter: Arc<dyn Reporter>, precision: u32) -> Self {
        TensorEncoder {
            scheme,
            keys,
            reporter,
            precision,
        }
    }

    /// Encrypts a sequence of plaintext numerics into an [`EncryptedTensor`],
    /// one [`Fraction`] per element (spec.md §4.8's `encrypt_float`). With
    /// the `parallel` feature enabled, elements are encrypted across a
    /// rayon thread pool instead of sequentially; either way the output
    /// preserves `values`' order.
    pub fn encrypt(&self, values: &[Numeric], rng: &mut dyn RngCore) -> Result<EncryptedTensor> {
        let plaintext_modulo = self.scheme.plaintext_modulo(&self.keys)?;
        let ten_pow_precision = BigUint::from(10u8).pow(self.precision);

        // Divisor is pre-encrypted once per tensor and shared by every
        // element (spec.md §4.8's explicit invariant).
        let divisor_ct = self.encrypt_raw(&ten_pow_precision, rng)?;
        let zero_ct = self.encrypt_raw(&BigUint::zero(), rng)?;

        #[cfg(feature = "parallel")]
        let fractions = self.encode_all_parallel(values, &plaintext_modulo, &divisor_ct, &zero_ct, rng)?;
        #[cfg(not(feature = "parallel"))]
        let fractions = self.encode_all_sequential(values, &plaintext_modulo, &divisor_ct, &zero_ct, rng)?;

        Ok(EncryptedTensor::new(fractions, self.precision, plaintext_modulo))
    }

    fn encode_all_sequential(
        &self,
        values: &[Numeric],
        plaintext_modulo: &BigUint,
        divisor_ct: &CiphertextHandle,
        zero_ct: &CiphertextHandle,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Fraction>> {
        let mut fractions = Vec::with_capacity(values.len());
        for value in values {
            fractions.push(self.encode_one(value, plaintext_modulo, divisor_ct, zero_ct, rng)?);
        }
        Ok(fractions)
    }

    /// Per-element encryption needs its own RNG once split across threads
    /// (`rng: &mut dyn RngCore` is neither `Send` nor cloneable), so a
    /// distinct seed is drawn from the caller's RNG up front, sequentially,
    /// one per element, and each thread derives its own [`ChaCha20Rng`] from
    /// its element's seed — the same "seed per unit of parallel work" split
    /// the arkworks KZG ceremony sequencer uses before handing work to
    /// `into_par_iter`.
    #[cfg(feature = "parallel")]
    fn encode_all_parallel(
        &self,
        values: &[Numeric],
        plaintext_modulo: &BigUint,
        divisor_ct: &CiphertextHandle,
        zero_ct: &CiphertextHandle,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Fraction>> {
        let seeds: Vec<[u8; 32]> = (0..values.len())
            .map(|_| {
                let mut seed = [0u8; 32];
                rng.fill_bytes(&mut seed);
                seed
            })
            .collect();

        values
            .par_iter()
            .zip(seeds.into_par_iter())
            .map(|(value, seed)| {
                let mut local_rng = ChaCha20Rng::from_seed(seed);
                self.encode_one(value, plaintext_modulo, divisor_ct, zero_ct, &mut local_rng)
            })
            .collect()
    }

    fn encode_one(
        &self,
        value: &Numeric,
        plaintext_modulo: &BigUint,
        divisor_ct: &CiphertextHandle,
        zero_ct: &CiphertextHandle,
        rng: &mut dyn RngCore,
    ) -> Result<Fraction> {
        let (dividend_plain, abs_dividend_plain, sign) = match value {
            Numeric::Int(m) if m.is_zero() => {
                return Ok(Fraction {
                    dividend: zero_ct.clone(),
                    abs_dividend: zero_ct.clone(),
                    divisor: divisor_ct.clone(),
                    sign: 1,
                })
            }
            Numeric::Int(m) => encode_int(m, plaintext_modulo, self.precision),
            Numeric::Float(m) if *m == 0.0 => {
                return Ok(Fraction {
                    dividend: zero_ct.clone(),
                    abs_dividend: zero_ct.clone(),
                    divisor: divisor_ct.clone(),
                    sign: 1,
                })
            }
            Numeric::Float(m) => encode_float(*m, plaintext_modulo, self.precision)?,
        };

        Ok(Fraction {
            dividend: self.encrypt_raw(&dividend_plain, rng)?,
            abs_dividend: self.encrypt_raw(&abs_dividend_plain, rng)?,
            divisor: divisor_ct.clone(),
            sign,
        })
    }

    fn encrypt_raw(&self, m: &BigUint, rng: &mut dyn RngCore) -> Result<CiphertextHandle> {
        let ciphertext = self.scheme.encrypt(&self.keys, m, rng, self.reporter.as_ref())?;
        Ok(CiphertextHandle::new(
            self.scheme.clone(),
            self.keys.clone(),
            self.reporter.clone(),
            ciphertext,
        ))
    }
}

/// `(m mod plaintext_modulo) * 10^precision`, `(|m| mod plaintext_modulo) *
/// 10^precision`, `sign(m)` — the integer branch of spec.md §4.8's encoding.
fn encode_int(m: &BigInt, plaintext_modulo: &BigUint, precision: u32) -> (BigUint, BigUint, i8) {
    let sign: i8 = if m.sign() == Sign::Minus { -1 } else { 1 };
    let ten_pow = BigUint::from(10u8).pow(precision);
    let modulo_signed = BigInt::from(plaintext_modulo.clone());

    let wrapped = m.mod_floor(&modulo_signed).magnitude().clone();
    let dividend = &wrapped * &ten_pow;

    let abs_wrapped = m.magnitude() % plaintext_modulo;
    let abs_dividend = &abs_wrapped * &ten_pow;

    (dividend, abs_dividend, sign)
}

/// Same as [`encode_int`] but for a float, routing the scaling through
/// [`fractionize`] for exact decimal precision (spec.md §4.8's float
/// branch). `original_source` reduces the float mod the plaintext modulus
/// with plain float arithmetic before fractionizing; we do the same rather
/// than a big-integer reduction, since `fractionize` already consumes an
/// `f64`.
fn encode_float(m: f64, plaintext_modulo: &BigUint, precision: u32) -> Result<(BigUint, BigUint, i8)> {
    let sign: i8 = if m < 0.0 { -1 } else { 1 };
    let wrapped = float_mod(m, plaintext_modulo);
    let (dividend, _) = fractionize(wrapped, plaintext_modulo, precision)?;
    let abs_wrapped = float_mod(m.abs(), plaintext_modulo);
    let (abs_dividend, _) = fractionize(abs_wrapped, plaintext_modulo, precision)?;
    Ok((dividend, abs_dividend, sign))
}

/// Euclidean float modulo against a (possibly huge) modulus, matching
/// Python's `%` semantics that `original_source` relies on when it computes
/// `m % self.cs.plaintext_modulo` on a float. For typical tensor elements
/// (small compared to a cryptographic modulus) this is the identity.
pub(crate) fn float_mod(value: f64, modulus: &BigUint) -> f64 {
    let m = modulus_to_f64(modulus);
    if m == 0.0 {
        return value;
    }
    let r = value % m;
    if r < 0.0 {
        r + m
    } else {
        r
    }
}

fn modulus_to_f64(modulus: &BigUint) -> f64 {
    use num_traits::ToPrimitive;
    modulus.to_f64().unwrap_or(f64::MAX)
}
