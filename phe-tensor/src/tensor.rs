//! [`EncryptedTensor`] (spec.md §3, §4.8): an ordered sequence of
//! [`Fraction`]s sharing a precision and a plaintext modulus, plus the
//! homomorphic element-wise operators spec.md defines over it.

use num_bigint::{BigUint, Sign};
use num_traits::ToPrimitive;
use phe_core::fixed_point::{fractionize, Numeric};
use phe_core::Event;

use crate::encoder::float_mod;
use crate::error::{Error, Result};
use crate::fraction::Fraction;

/// An encrypted, ordered numeric sequence (spec.md §3's `EncryptedTensor`).
#[derive(Debug, Clone)]
pub struct EncryptedTensor {
    /// One element per input value.
    pub fractions: Vec<Fraction>,
    /// Fixed-point precision shared by every element's divisor.
    pub precision: u32,
    /// The scheme's plaintext group, cached at encryption time so
    /// element-wise ops against a plain list don't need a live scheme
    /// handle.
    pub plaintext_modulo: BigUint,
}

impl EncryptedTensor {
    pub(crate) fn new(fractions: Vec<Fraction>, precision: u32, plaintext_modulo: BigUint) -> Self {
        EncryptedTensor {
            fractions,
            precision,
            plaintext_modulo,
        }
    }

    fn check_same_length(&self, other_len: usize) -> Result<()> {
        if self.fractions.len() != other_len {
            return Err(Error::LengthMismatch {
                expected: self.fractions.len(),
                actual: other_len,
            });
        }
        Ok(())
    }

    /// `T + U`, element-wise (spec.md §4.8).
    pub fn add(&self, other: &EncryptedTensor) -> Result<EncryptedTensor> {
        self.check_same_length(other.fractions.len())?;
        let mut fractions = Vec::with_capacity(self.fractions.len());
        for (i, (alpha, beta)) in self.fractions.iter().zip(&other.fractions).enumerate() {
            let dividend = alpha.dividend.add(&beta.dividend)?;
            let (abs_dividend, sign) = if alpha.sign == -1 && beta.sign == -1 {
                (alpha.abs_dividend.add(&beta.abs_dividend)?, -1)
            } else {
                if alpha.sign != beta.sign {
                    alpha.dividend.reporter().note(Event::MixedSignTensorAdd { index: i });
                }
                (dividend.clone(), 1)
            };
            fractions.push(Fraction {
                dividend,
                abs_dividend,
                divisor: alpha.divisor.clone(),
                sign,
            });
        }
        Ok(EncryptedTensor::new(fractions, self.precision, self.plaintext_modulo.clone()))
    }

    /// `T * U`, element-wise homomorphic multiply (spec.md §4.8).
    pub fn mul(&self, other: &EncryptedTensor) -> Result<EncryptedTensor> {
        self.check_same_length(other.fractions.len())?;
        let mut fractions = Vec::with_capacity(self.fractions.len());
        for (alpha, beta) in self.fractions.iter().zip(&other.fractions) {
            fractions.push(Fraction {
                dividend: alpha.dividend.mul(&beta.dividend)?,
                abs_dividend: alpha.abs_dividend.mul(&beta.abs_dividend)?,
                divisor: alpha.divisor.mul(&beta.divisor)?,
                sign: alpha.sign * beta.sign,
            });
        }
        Ok(EncryptedTensor::new(fractions, self.precision, self.plaintext_modulo.clone()))
    }

    /// `T * scalar` for an integer or float constant (spec.md §4.8):
    /// `multiply_by_constant` on both dividend tracks, divisor unchanged,
    /// sign multiplied by `sign(scalar)`.
    pub fn mul_scalar(&self, scalar: &Numeric) -> Result<EncryptedTensor> {
        let (scalar_sign, magnitude_int, magnitude_float): (i8, Option<BigUint>, Option<f64>) = match scalar {
            Numeric::Int(v) => {
                let sign = if v.sign() == Sign::Minus { -1 } else { 1 };
                (sign, Some(v.magnitude().clone()), None)
            }
            Numeric::Float(v) => {
                let sign = if *v < 0.0 { -1 } else { 1 };
                (sign, None, Some(v.abs()))
            }
        };

        let mut fractions = Vec::with_capacity(self.fractions.len());
        for alpha in &self.fractions {
            let (dividend, abs_dividend) = match (&magnitude_int, magnitude_float) {
                (Some(k), None) => (alpha.dividend.mul_scalar(k)?, alpha.abs_dividend.mul_scalar(k)?),
                (None, Some(k)) => (
                    alpha.dividend.mul_scalar_float(k, self.precision)?,
                    alpha.abs_dividend.mul_scalar_float(k, self.precision)?,
                ),
                _ => unreachable!("exactly one of magnitude_int/magnitude_float is set"),
            };
            fractions.push(Fraction {
                dividend,
                abs_dividend,
                divisor: alpha.divisor.clone(),
                sign: scalar_sign * alpha.sign,
            });
        }
        Ok(EncryptedTensor::new(fractions, self.precision, self.plaintext_modulo.clone()))
    }

    /// `T * plain_list`: element-wise multiplication with a sequence of
    /// plaintext numerics. Requires every element of both sides to be
    /// non-negative (spec.md §4.8).
    pub fn mul_plain_list(&self, other: &[f64]) -> Result<EncryptedTensor> {
        self.check_same_length(other.len())?;
        if self.fractions.is_empty() {
            return Err(Error::EmptyTensor);
        }
        if other.iter().any(|v| *v < 0.0) || self.fractions.iter().any(|f| f.sign < 0) {
            return Err(Error::NegativeOperand);
        }

        let mut fractions = Vec::with_capacity(self.fractions.len());
        let mut shared_divisor = None;
        for (alpha, beta) in self.fractions.iter().zip(other) {
            let reduced = float_mod(beta.abs(), &self.plaintext_modulo);
            let (c_abs_dividend, c_divisor) = fractionize(reduced, &self.plaintext_modulo, self.precision)?;

            let dividend = alpha.abs_dividend.mul_scalar(&c_abs_dividend)?;
            let divisor = match &shared_divisor {
                Some(d) => d.clone(),
                None => {
                    let d = alpha.divisor.mul_scalar(&c_divisor)?;
                    shared_divisor = Some(d.clone());
                    d
                }
            };

            fractions.push(Fraction {
                dividend: dividend.clone(),
                abs_dividend: dividend,
                divisor,
                sign: 1,
            });
        }
        Ok(EncryptedTensor::new(fractions, self.precision, self.plaintext_modulo.clone()))
    }

    /// `T @ plain_list` (dot product): element-wise multiply, then sum all
    /// `abs_dividend`s via scheme-add. Returns a one-element tensor whose
    /// decryption yields the inner product (spec.md §4.8).
    pub fn dot(&self, other: &[f64]) -> Result<EncryptedTensor> {
        let elementwise = self.mul_plain_list(other)?;
        let mut fractions = elementwise.fractions.into_iter();
        let first = fractions.next().ok_or(Error::EmptyTensor)?;
        let divisor = first.divisor.clone();
        let mut sum_dividend = first.abs_dividend;
        for fraction in fractions {
            sum_dividend = sum_dividend.add(&fraction.abs_dividend)?;
        }
        let fraction = Fraction {
            dividend: sum_dividend.clone(),
            abs_dividend: sum_dividend,
            divisor,
            sign: 1,
        };
        Ok(EncryptedTensor::new(vec![fraction], self.precision, self.plaintext_modulo.clone()))
    }

    /// Decrypts every element: `sign * decrypt(abs_dividend) /
    /// decrypt(divisor)` (spec.md §4.8).
    pub fn decrypt(&self) -> Result<Vec<f64>> {
        self.fractions
            .iter()
            .map(|fraction| {
                let abs_dividend = fraction.abs_dividend.decrypt()?;
                let divisor = fraction.divisor.decrypt()?;
                let numerator = biguint_to_f64(&abs_dividend);
                let denominator = biguint_to_f64(&divisor);
                Ok(fraction.sign as f64 * numerator / denominator)
            })
            .collect()
    }
}

fn biguint_to_f64(value: &BigUint) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use phe_core::NoopReporter;
    use phe_schemes::{KeyMaterial, KeygenConfig, Paillier, Scheme};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::encoder::TensorEncoder;

    const THRESHOLD: f64 = 1.0;

    fn encoder(precision: u32) -> (TensorEncoder, ChaCha20Rng) {
        let scheme = Paillier;
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        let keys = scheme.keygen(&config, &mut rng).unwrap();
        let encoder = TensorEncoder::new(Arc::new(Paillier), Arc::new(keys), Arc::new(NoopReporter), precision);
        (encoder, rng)
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < THRESHOLD, "got {a}, expected {e}");
        }
    }

    #[test]
    fn add_roundtrips() {
        let (encoder, mut rng) = encoder(3);
        let a = encoder
            .encrypt(&[Numeric::Int(5.into()), Numeric::Float(2.5)], &mut rng)
            .unwrap();
        let b = encoder
            .encrypt(&[Numeric::Int(3.into()), Numeric::Float(1.5)], &mut rng)
            .unwrap();
        let sum = a.add(&b).unwrap();
        assert_close(&sum.decrypt().unwrap(), &[8.0, 4.0]);
    }

    #[test]
    fn mul_is_homomorphic() {
        let (encoder, mut rng) = encoder(3);
        let a = encoder.encrypt(&[Numeric::Int(4.into())], &mut rng).unwrap();
        let b = encoder.encrypt(&[Numeric::Int(6.into())], &mut rng).unwrap();
        let product = a.mul(&b).unwrap();
        assert_close(&product.decrypt().unwrap(), &[24.0]);
    }

    #[test]
    fn mul_scalar_int_and_float() {
        let (encoder, mut rng) = encoder(3);
        let a = encoder
            .encrypt(&[Numeric::Int(5.into()), Numeric::Float(2.0)], &mut rng)
            .unwrap();
        let scaled_int = a.mul_scalar(&Numeric::Int(3.into())).unwrap();
        assert_close(&scaled_int.decrypt().unwrap(), &[15.0, 6.0]);

        let scaled_float = a.mul_scalar(&Numeric::Float(1.5)).unwrap();
        assert_close(&scaled_float.decrypt().unwrap(), &[7.5, 3.0]);
    }

    #[test]
    fn mul_plain_list_and_dot() {
        let (encoder, mut rng) = encoder(3);
        let a = encoder
            .encrypt(&[Numeric::Int(2.into()), Numeric::Int(3.into())], &mut rng)
            .unwrap();
        let elementwise = a.mul_plain_list(&[4.0, 5.0]).unwrap();
        assert_close(&elementwise.decrypt().unwrap(), &[8.0, 15.0]);

        let dot = a.dot(&[4.0, 5.0]).unwrap();
        assert_close(&dot.decrypt().unwrap(), &[23.0]);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let (encoder, mut rng) = encoder(2);
        let a = encoder.encrypt(&[Numeric::Int(1.into())], &mut rng).unwrap();
        let b = encoder
            .encrypt(&[Numeric::Int(1.into()), Numeric::Int(2.into())], &mut rng)
            .unwrap();
        assert!(matches!(a.add(&b), Err(Error::LengthMismatch { .. })));
    }

    #[test]
    fn negative_plain_list_is_rejected() {
        let (encoder, mut rng) = encoder(2);
        let a = encoder.encrypt(&[Numeric::Int(1.into())], &mut rng).unwrap();
        assert!(matches!(a.mul_plain_list(&[-1.0]), Err(Error::NegativeOperand)));
    }
}
