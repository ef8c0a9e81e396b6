//! Elliptic-Curve ElGamal (spec.md §4.4 consumer, §4.2 description):
//! additive only, decryption requires a bounded ECDLP search.

use num_bigint::{BigInt, BigUint};
use phe_core::curve;
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::Scheme;

/// Bound on the brute-force ECDLP search `decrypt` runs, mirroring
/// [`crate::schemes::elgamal::MAX_DISCRETE_LOG_SEARCH`] for the same reason:
/// a curve's order is cryptographically large, but the plaintexts this
/// library actually encrypts (tensor entries, salaries, small ints) are not.
pub const MAX_DISCRETE_LOG_SEARCH: u64 = 1_000_000;

#[derive(Debug, Default, Clone, Copy)]
pub struct EcElGamal;

fn random_scalar(order: &BigUint, rng: &mut dyn RngCore) -> BigInt {
    let bytes = order.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) % order;
        if candidate >= BigUint::from(1u8) {
            return BigInt::from(candidate);
        }
    }
}

impl Scheme for EcElGamal {
    fn kind(&self) -> SchemeKind {
        SchemeKind::EcElGamal
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let curve = curve::catalogue::lookup(
            config.curve_form.as_deref().unwrap_or("weierstrass"),
            config.curve_name.as_deref(),
        )?;
        let ka = random_scalar(curve.order(), rng);
        let g = curve.generator();
        let qa = curve.scalar_multiply(&g, &ka)?;

        Ok(KeyMaterial {
            kind: SchemeKind::EcElGamal,
            public: PublicKey::EcElGamal { curve, qa },
            private: Some(PrivateKey::EcElGamal { ka }),
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::EcElGamal { curve, .. } => Ok(curve.order().clone()),
            _ => Err(self.missing_key("plaintext_modulo", "public")),
        }
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        self.plaintext_modulo(key)
    }

    fn encrypt(
        &self,
        key: &KeyMaterial,
        m: &BigUint,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::EcElGamal { curve, qa } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let order = curve.order().clone();
        let m = if m >= &order {
            let reduced = m % &order;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: m.to_string(),
                reduced: reduced.to_string(),
                modulo: order.to_string(),
            });
            reduced
        } else {
            m.clone()
        };
        let g = curve.generator();
        let r = random_scalar(&order, rng);

        let s = curve.scalar_multiply(&g, &BigInt::from(m))?;
        let c1 = curve.scalar_multiply(&g, &r)?;
        let c2_partial = curve.scalar_multiply(qa, &r)?;
        let c2 = curve.add(&c2_partial, &s)?;

        Ok(Ciphertext::EcPair(c1, c2))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::EcElGamal { curve, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::EcElGamal { ka }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::EcPair(c1, c2) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };

        let c1_neg = curve.negate(c1);
        let s_prime = curve.scalar_multiply(&c1_neg, ka)?;
        let s_prime = curve.add(c2, &s_prime)?;

        if s_prime == curve.identity() {
            return Ok(BigUint::from(0u8));
        }
        let g = curve.generator();
        let mut accumulated = g.clone();
        if accumulated == s_prime {
            return Ok(BigUint::from(1u8));
        }
        for k in 2..=MAX_DISCRETE_LOG_SEARCH {
            accumulated = curve.add(&accumulated, &g)?;
            if accumulated == s_prime {
                return Ok(BigUint::from(k));
            }
        }
        Err(Error::DecryptionFailure {
            scheme: self.name(),
            bound: MAX_DISCRETE_LOG_SEARCH.to_string(),
        })
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let PublicKey::EcElGamal { curve, .. } = &key.public else {
            return Err(self.missing_key("add", "public"));
        };
        let (Ciphertext::EcPair(a1, a2), Ciphertext::EcPair(b1, b2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        let sum1 = curve.add(a1, b1)?;
        let sum2 = curve.add(a2, b2)?;
        Ok(Ciphertext::EcPair(sum1, sum2))
    }

    fn multiply_by_constant(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        k: &BigUint,
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::EcElGamal { curve, .. } = &key.public else {
            return Err(self.missing_key("multiply_by_constant", "public"));
        };
        let Ciphertext::EcPair(c1, c2) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let order = curve.order().clone();
        let k = if k >= &order {
            let reduced = k % &order;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: k.to_string(),
                reduced: reduced.to_string(),
                modulo: order.to_string(),
            });
            reduced
        } else {
            k.clone()
        };
        let k = BigInt::from(k);
        let new_c1 = curve.scalar_multiply(c1, &k)?;
        let new_c2 = curve.scalar_multiply(c2, &k)?;
        Ok(Ciphertext::EcPair(new_c1, new_c2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn keys() -> KeyMaterial {
        let scheme = EcElGamal;
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let config = KeygenConfig::default();
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip_small_scalar() {
        let scheme = EcElGamal;
        let keys = keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(9u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = EcElGamal;
        let keys = keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(4u32);
        let b = BigUint::from(5u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), BigUint::from(9u32));
    }

    #[test]
    fn multiply_is_unsupported() {
        let scheme = EcElGamal;
        let keys = keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let c = scheme
            .encrypt(&keys, &BigUint::from(1u32), &mut rng, &reporter)
            .unwrap();
        assert!(scheme.multiply(&keys, &c, &c).is_err());
        assert!(scheme.reencrypt(&keys, &c, &mut rng, &reporter).is_err());
    }
}
