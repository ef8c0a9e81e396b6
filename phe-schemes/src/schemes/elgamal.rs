//! ElGamal and Exponential ElGamal (spec.md §4.2): share a key format and
//! ciphertext shape, differing only in which operation (`multiply` vs
//! `add`) the `(c1, c2)` pair supports and in how decryption recovers `m`
//! from `g^m` (exponential variant needs a bounded discrete-log search).

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use phe_core::bigint::{mod_pow, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, Scheme};

/// Bound on the brute-force discrete-log search Exponential ElGamal's
/// decrypt runs. Real moduli are far larger than any plaintext this search
/// could recover in reasonable time, so this caps the search rather than
/// the modulus: once exceeded, decrypt fails with
/// [`Error::DecryptionFailure`] instead of looping until `p`.
pub const MAX_DISCRETE_LOG_SEARCH: u64 = 1_000_000;

#[derive(Debug, Clone, Copy)]
pub struct ElGamal {
    exponential: bool,
}

impl ElGamal {
    pub fn multiplicative() -> Self {
        ElGamal { exponential: false }
    }

    pub fn exponential() -> Self {
        ElGamal { exponential: true }
    }
}

impl Default for ElGamal {
    fn default() -> Self {
        ElGamal::multiplicative()
    }
}

fn random_in_range(low: u8, bound: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    let bytes = bound.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) % bound;
        if candidate >= BigUint::from(low) {
            return candidate;
        }
    }
}

impl Scheme for ElGamal {
    fn kind(&self) -> SchemeKind {
        if self.exponential {
            SchemeKind::ExponentialElGamal
        } else {
            SchemeKind::ElGamal
        }
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let bits = config.key_size.max(16);
        for _ in 0..config.max_tries {
            let p = match random_prime(bits, bits + 8, rng) {
                Ok(p) => p,
                Err(_) => continue,
            };
            // g in [2, floor(sqrt(p))], matching original_source's
            // `random.randint(2, int(sqrt(p)))`.
            let sqrt_p = p.sqrt();
            if sqrt_p < BigUint::from(2u8) {
                continue;
            }
            let g = random_in_range(2, &(&sqrt_p - BigUint::from(1u8)), rng) + BigUint::from(2u8);
            let x = random_in_range(1, &(&p - BigUint::from(2u8)), rng) + BigUint::from(1u8);
            let y = core_err(mod_pow(
                &num_bigint::BigInt::from(g.clone()),
                &num_bigint::BigInt::from(x.clone()),
                &num_bigint::BigInt::from(p.clone()),
            ))?;

            return Ok(KeyMaterial {
                kind: self.kind(),
                public: PublicKey::ElGamal {
                    p,
                    g,
                    y: y.magnitude().clone(),
                },
                private: Some(PrivateKey::ElGamal { x }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::ElGamal { p, .. } => Ok(p.clone()),
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
        let PublicKey::ElGamal { p, g, y } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let m = if m >= p {
            let reduced = m % p;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: m.to_string(),
                reduced: reduced.to_string(),
                modulo: p.to_string(),
            });
            reduced
        } else {
            m.clone()
        };
        let r = random_in_range(1, &(p - BigUint::from(1u8)), rng) + BigUint::from(1u8);
        let c1 = core_err(mod_pow(
            &num_bigint::BigInt::from(g.clone()),
            &num_bigint::BigInt::from(r.clone()),
            &num_bigint::BigInt::from(p.clone()),
        ))?
        .magnitude()
        .clone();
        let yr = core_err(mod_pow(
            &num_bigint::BigInt::from(y.clone()),
            &num_bigint::BigInt::from(r),
            &num_bigint::BigInt::from(p.clone()),
        ))?
        .magnitude()
        .clone();
        let c2 = if self.exponential {
            let gm = core_err(mod_pow(
                &num_bigint::BigInt::from(g.clone()),
                &num_bigint::BigInt::from(m),
                &num_bigint::BigInt::from(p.clone()),
            ))?
            .magnitude()
            .clone();
            (gm * yr).mod_floor(p)
        } else {
            (m * yr).mod_floor(p)
        };
        Ok(Ciphertext::Pair(c1, c2))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::ElGamal { p, g, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::ElGamal { x }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Pair(c1, c2) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let neg_x = -num_bigint::BigInt::from(x.clone());
        let s = core_err(mod_pow(
            &num_bigint::BigInt::from(c1.clone()),
            &neg_x,
            &num_bigint::BigInt::from(p.clone()),
        ))?
        .magnitude()
        .clone();
        let m_prime = (c2 * s).mod_floor(p);

        if !self.exponential {
            return Ok(m_prime);
        }

        let mut candidate_power = BigUint::one();
        if candidate_power == m_prime {
            return Ok(BigUint::zero());
        }
        for m in 1..=MAX_DISCRETE_LOG_SEARCH {
            candidate_power = (&candidate_power * g).mod_floor(p);
            if candidate_power == m_prime {
                return Ok(BigUint::from(m));
            }
        }
        Err(Error::DecryptionFailure {
            scheme: self.name(),
            bound: MAX_DISCRETE_LOG_SEARCH.to_string(),
        })
    }

    fn multiply(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        if self.exponential {
            return Err(self.unsupported("multiply"));
        }
        let PublicKey::ElGamal { p, .. } = &key.public else {
            return Err(self.missing_key("multiply", "public"));
        };
        let (Ciphertext::Pair(a1, a2), Ciphertext::Pair(b1, b2)) = (c1, c2) else {
            return Err(self.unsupported("multiply (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Pair((a1 * b1).mod_floor(p), (a2 * b2).mod_floor(p)))
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        if !self.exponential {
            return Err(self.unsupported("add"));
        }
        let PublicKey::ElGamal { p, .. } = &key.public else {
            return Err(self.missing_key("add", "public"));
        };
        let (Ciphertext::Pair(a1, a2), Ciphertext::Pair(b1, b2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Pair((a1 * b1).mod_floor(p), (a2 * b2).mod_floor(p)))
    }

    fn multiply_by_constant(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        k: &BigUint,
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        if !self.exponential {
            return Err(self.unsupported("scalar multiplication"));
        }
        let PublicKey::ElGamal { p, .. } = &key.public else {
            return Err(self.missing_key("multiply_by_constant", "public"));
        };
        let Ciphertext::Pair(c1, c2) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= p {
            let reduced = k % p;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: k.to_string(),
                reduced: reduced.to_string(),
                modulo: p.to_string(),
            });
            reduced
        } else {
            k.clone()
        };
        let new_c1 = core_err(mod_pow(
            &num_bigint::BigInt::from(c1.clone()),
            &num_bigint::BigInt::from(k.clone()),
            &num_bigint::BigInt::from(p.clone()),
        ))?
        .magnitude()
        .clone();
        let new_c2 = core_err(mod_pow(
            &num_bigint::BigInt::from(c2.clone()),
            &num_bigint::BigInt::from(k),
            &num_bigint::BigInt::from(p.clone()),
        ))?
        .magnitude()
        .clone();
        Ok(Ciphertext::Pair(new_c1, new_c2))
    }

    fn reencrypt(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let neutral = if self.exponential {
            BigUint::zero()
        } else {
            BigUint::one()
        };
        let blinding = self.encrypt(key, &neutral, rng, reporter)?;
        if self.exponential {
            self.add(key, c, &blinding)
        } else {
            self.multiply(key, c, &blinding)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_keys(scheme: &ElGamal) -> KeyMaterial {
        let mut rng = ChaCha20Rng::seed_from_u64(23);
        let config = KeygenConfig {
            key_size: 32,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn multiplicative_roundtrip_and_multiply() {
        let scheme = ElGamal::multiplicative();
        let keys = small_keys(&scheme);
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let a = BigUint::from(6u32);
        let b = BigUint::from(7u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &ca).unwrap(), a);
        let product = scheme.multiply(&keys, &ca, &cb).unwrap();
        let recovered = scheme.decrypt(&keys, &product).unwrap();
        assert_eq!(recovered, (&a * &b) % &scheme.plaintext_modulo(&keys).unwrap());
    }

    #[test]
    fn exponential_add_and_scalar() {
        let scheme = ElGamal::exponential();
        let keys = small_keys(&scheme);
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(17u32);
        let b = BigUint::from(21u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), BigUint::from(38u32));
        let scaled = scheme
            .multiply_by_constant(&keys, &ca, &BigUint::from(5u32), &mut rng, &reporter)
            .unwrap();
        assert_eq!(scheme.decrypt(&keys, &scaled).unwrap(), BigUint::from(85u32));
    }
}
