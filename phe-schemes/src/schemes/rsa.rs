//! RSA (spec.md §4.1): multiplicative homomorphism only,
//! `E(m1) * E(m2) = E(m1 * m2) mod n`.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::One;
use phe_core::bigint::{gcd, mod_inv, mod_pow, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, Scheme};

/// Textbook RSA, public exponent selected uniformly and checked coprime to
/// `phi`, matching `original_source`'s rejection-sampling loop for `e`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rsa;

fn reduce(m: &BigUint, n: &BigUint, scheme: &'static str, reporter: &dyn Reporter) -> BigUint {
    if m >= n {
        let reduced = m % n;
        reporter.note(Event::PlaintextReduced {
            source: scheme,
            original: m.to_string(),
            reduced: reduced.to_string(),
            modulo: n.to_string(),
        });
        reduced
    } else {
        m.clone()
    }
}

/// Draws a uniform candidate in `[2, bound)`, rejection-sampling on byte
/// width the same way `original_source`'s `random.randint(1, phi - 1)` does.
fn random_in_range(bound: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    let bytes = bound.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf);
        if candidate >= BigUint::from(2u8) && &candidate < bound {
            return candidate;
        }
    }
}

impl Scheme for Rsa {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Rsa
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let half = (config.key_size / 2).max(16);
        for _ in 0..config.max_tries {
            let p = match random_prime(half, half + 8, rng) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let q = match random_prime(half, half + 8, rng) {
                Ok(q) => q,
                Err(_) => continue,
            };
            if p == q {
                continue;
            }
            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());
            let phi_signed = BigInt::from(phi.clone());

            let mut chosen_e = None;
            for _ in 0..1000 {
                let candidate = random_in_range(&phi, rng);
                let candidate_signed = BigInt::from(candidate.clone());
                if gcd(&candidate_signed, &phi_signed) == BigInt::one() {
                    chosen_e = Some(candidate);
                    break;
                }
            }
            let Some(e) = chosen_e else { continue };
            let e_signed = BigInt::from(e.clone());
            let Ok(d) = mod_inv(&e_signed, &phi_signed) else {
                continue;
            };
            let d = d.magnitude().clone();

            return Ok(KeyMaterial {
                kind: SchemeKind::Rsa,
                public: PublicKey::Rsa { n, e },
                private: Some(PrivateKey::Rsa { d }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::Rsa { n, .. } => Ok(n.clone()),
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
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::Rsa { n, e } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let m = reduce(m, n, self.name(), reporter);
        let c = core_err(mod_pow(&BigInt::from(m), &BigInt::from(e.clone()), &BigInt::from(n.clone())))?;
        Ok(Ciphertext::Integer(c.magnitude().clone()))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::Rsa { n, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::Rsa { d }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let p = core_err(mod_pow(&BigInt::from(c.clone()), &BigInt::from(d.clone()), &BigInt::from(n.clone())))?;
        Ok(p.magnitude().clone())
    }

    fn multiply(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let PublicKey::Rsa { n, .. } = &key.public else {
            return Err(self.missing_key("multiply", "public"));
        };
        let (Ciphertext::Integer(c1), Ciphertext::Integer(c2)) = (c1, c2) else {
            return Err(self.unsupported("multiply (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Integer((c1 * c2).mod_floor(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_keys() -> KeyMaterial {
        let scheme = Rsa;
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let scheme = Rsa;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(42u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        let recovered = scheme.decrypt(&keys, &c).unwrap();
        assert_eq!(recovered, m);
    }

    #[test]
    fn multiply_is_homomorphic() {
        let scheme = Rsa;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(6u32);
        let b = BigUint::from(7u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let product = scheme.multiply(&keys, &ca, &cb).unwrap();
        let recovered = scheme.decrypt(&keys, &product).unwrap();
        assert_eq!(recovered, (&a * &b) % &scheme.plaintext_modulo(&keys).unwrap());
    }

    #[test]
    fn add_is_unsupported() {
        let scheme = Rsa;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let c = scheme
            .encrypt(&keys, &BigUint::from(1u32), &mut rng, &reporter)
            .unwrap();
        assert!(scheme.add(&keys, &c, &c).is_err());
    }
}
