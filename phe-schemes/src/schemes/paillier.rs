//! Paillier (spec.md §4.2): additive homomorphism,
//! `E(m1) * E(m2) mod n^2 = E(m1 + m2)`, plus scalar multiplication via
//! exponentiation.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use phe_core::bigint::{gcd, mod_inv, mod_pow, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, reencrypt_additive, Scheme};

/// `g = n + 1` generator, matching `original_source`'s fixed choice (the
/// general Paillier scheme allows any `g` with the right order, but the
/// `g = n+1` specialisation avoids a discrete-log step in keygen).
#[derive(Debug, Default, Clone, Copy)]
pub struct Paillier;

fn random_coprime_to(n: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    let bytes = n.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) % n;
        if candidate.is_zero() {
            continue;
        }
        let g = gcd(
            &num_bigint::BigInt::from(candidate.clone()),
            &num_bigint::BigInt::from(n.clone()),
        );
        if g == num_bigint::BigInt::one() {
            return candidate;
        }
    }
}

/// `(x - 1) / n`, the `L` function from the Paillier paper.
fn lx(x: &BigUint, n: &BigUint) -> BigUint {
    (x - BigUint::one()) / n
}

impl Scheme for Paillier {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Paillier
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
            let g = &n + BigUint::one();

            return Ok(KeyMaterial {
                kind: SchemeKind::Paillier,
                public: PublicKey::Paillier { n, g },
                private: Some(PrivateKey::Paillier { phi }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::Paillier { n, .. } => Ok(n.clone()),
            _ => Err(self.missing_key("plaintext_modulo", "public")),
        }
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        let n = self.plaintext_modulo(key)?;
        Ok(&n * &n)
    }

    fn encrypt(
        &self,
        key: &KeyMaterial,
        m: &BigUint,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::Paillier { n, g } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let n2 = n * n;
        let m = if m >= n {
            let reduced = m % n;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: m.to_string(),
                reduced: reduced.to_string(),
                modulo: n.to_string(),
            });
            reduced
        } else {
            m.clone()
        };
        let r = random_coprime_to(n, rng);
        let gm = core_err(mod_pow(
            &num_bigint::BigInt::from(g.clone()),
            &num_bigint::BigInt::from(m),
            &num_bigint::BigInt::from(n2.clone()),
        ))?;
        let rn = core_err(mod_pow(
            &num_bigint::BigInt::from(r),
            &num_bigint::BigInt::from(n.clone()),
            &num_bigint::BigInt::from(n2.clone()),
        ))?;
        let c = (gm.magnitude() * rn.magnitude()) % &n2;
        Ok(Ciphertext::Integer(c))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::Paillier { n, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::Paillier { phi }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let n2 = n * n;
        let mu = core_err(mod_inv(
            &num_bigint::BigInt::from(phi.clone()),
            &num_bigint::BigInt::from(n.clone()),
        ))?;
        let u = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(phi.clone()),
            &num_bigint::BigInt::from(n2),
        ))?;
        let l = lx(u.magnitude(), n);
        Ok((l * mu.magnitude()).mod_floor(n))
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let PublicKey::Paillier { n, .. } = &key.public else {
            return Err(self.missing_key("add", "public"));
        };
        let (Ciphertext::Integer(c1), Ciphertext::Integer(c2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        let n2 = n * n;
        Ok(Ciphertext::Integer((c1 * c2).mod_floor(&n2)))
    }

    fn multiply_by_constant(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        k: &BigUint,
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::Paillier { n, .. } = &key.public else {
            return Err(self.missing_key("multiply_by_constant", "public"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= n {
            let reduced = k % n;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: k.to_string(),
                reduced: reduced.to_string(),
                modulo: n.to_string(),
            });
            reduced
        } else {
            k.clone()
        };
        let n2 = n * n;
        let result = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(k),
            &num_bigint::BigInt::from(n2),
        ))?;
        Ok(Ciphertext::Integer(result.magnitude().clone()))
    }

    fn reencrypt(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        reencrypt_additive(self, key, c, rng, reporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_keys() -> KeyMaterial {
        let scheme = Paillier;
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let scheme = Paillier;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(123u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = Paillier;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(40u32);
        let b = BigUint::from(2u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), &a + &b);
    }

    #[test]
    fn scalar_multiply_matches_repeated_addition() {
        let scheme = Paillier;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let m = BigUint::from(7u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        let scaled = scheme
            .multiply_by_constant(&keys, &c, &BigUint::from(5u32), &mut rng, &reporter)
            .unwrap();
        assert_eq!(scheme.decrypt(&keys, &scaled).unwrap(), BigUint::from(35u32));
    }

    #[test]
    fn reencrypt_preserves_plaintext() {
        let scheme = Paillier;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let m = BigUint::from(9u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        let c2 = scheme.reencrypt(&keys, &c, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c2).unwrap(), m);
    }
}
