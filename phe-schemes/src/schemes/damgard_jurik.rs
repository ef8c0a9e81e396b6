//! Damgård-Jurik (spec.md §4.2): Paillier generalised to ciphertext modulus
//! `n^(s+1)`. `s == 1` degenerates to Paillier; this module does not special
//! case that, it just runs the general exponent.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use phe_core::bigint::{gcd, mod_inv, mod_pow, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, reencrypt_additive, Scheme};

/// Default `s` when a caller doesn't pick one — `s = 2`, matching
/// `original_source`'s constructor default.
pub const DEFAULT_S: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct DamgardJurik {
    s: u32,
}

impl Default for DamgardJurik {
    fn default() -> Self {
        DamgardJurik { s: DEFAULT_S }
    }
}

impl DamgardJurik {
    pub fn new(s: u32) -> Self {
        DamgardJurik { s: s.max(1) }
    }
}

fn random_coprime_to(n: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    let bytes = n.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) % n;
        if candidate == BigUint::from(0u8) {
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

fn lx(x: &BigUint, n: &BigUint) -> BigUint {
    (x - BigUint::one()) / n
}

impl Scheme for DamgardJurik {
    fn kind(&self) -> SchemeKind {
        SchemeKind::DamgardJurik
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
                kind: SchemeKind::DamgardJurik,
                public: PublicKey::DamgardJurik { n, g, s: self.s },
                private: Some(PrivateKey::DamgardJurik { phi }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::DamgardJurik { n, .. } => Ok(n.clone()),
            _ => Err(self.missing_key("plaintext_modulo", "public")),
        }
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::DamgardJurik { n, s, .. } => Ok(n.pow(s + 1)),
            _ => Err(self.missing_key("ciphertext_modulo", "public")),
        }
    }

    fn encrypt(
        &self,
        key: &KeyMaterial,
        m: &BigUint,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let PublicKey::DamgardJurik { n, g, s } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let modulo = n.pow(s + 1);
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
            &num_bigint::BigInt::from(modulo.clone()),
        ))?;
        let rn = core_err(mod_pow(
            &num_bigint::BigInt::from(r),
            &num_bigint::BigInt::from(n.clone()),
            &num_bigint::BigInt::from(modulo.clone()),
        ))?;
        let c = (gm.magnitude() * rn.magnitude()) % &modulo;
        Ok(Ciphertext::Integer(c))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::DamgardJurik { n, s, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::DamgardJurik { phi }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let modulo = n.pow(s + 1);
        let mu = core_err(mod_inv(
            &num_bigint::BigInt::from(phi.clone()),
            &num_bigint::BigInt::from(n.clone()),
        ))?;
        let u = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(phi.clone()),
            &num_bigint::BigInt::from(modulo),
        ))?;
        let l = lx(u.magnitude(), n);
        Ok((l * mu.magnitude()).mod_floor(n))
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let modulo = self.ciphertext_modulo(key)?;
        let (Ciphertext::Integer(c1), Ciphertext::Integer(c2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Integer((c1 * c2).mod_floor(&modulo)))
    }

    fn multiply_by_constant(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        k: &BigUint,
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let n = self.plaintext_modulo(key)?;
        let modulo = self.ciphertext_modulo(key)?;
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= &n {
            let reduced = k % &n;
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
        let result = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(k),
            &num_bigint::BigInt::from(modulo),
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

    fn small_keys(s: u32) -> KeyMaterial {
        let scheme = DamgardJurik::new(s);
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip_with_s_equal_three() {
        let scheme = DamgardJurik::new(3);
        let keys = small_keys(3);
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(17u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = DamgardJurik::new(2);
        let keys = small_keys(2);
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(5u32);
        let b = BigUint::from(9u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), &a + &b);
    }
}
