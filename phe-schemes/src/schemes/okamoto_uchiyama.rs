//! Okamoto-Uchiyama (spec.md §4.2): additive homomorphism over `ℤ/p`,
//! ciphertexts living in `ℤ/p²q`. Decryption recovers `m` via a discrete
//! log taken inside the order-`p` subgroup of `(ℤ/p²)*`, which (unlike
//! Paillier's `L` function) needs a second `L`-style division by `g`'s own
//! image to cancel the generator out.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use phe_core::bigint::{mod_inv, mod_pow, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, reencrypt_additive, Scheme};

#[derive(Debug, Default, Clone, Copy)]
pub struct OkamotoUchiyama;

fn random_below(n: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    let bytes = n.bits().div_ceil(8).max(1) as usize;
    loop {
        let mut buf = vec![0u8; bytes];
        rng.fill_bytes(&mut buf);
        let candidate = BigUint::from_bytes_be(&buf) % n;
        if candidate >= BigUint::from(2u8) {
            return candidate;
        }
    }
}

/// `(x mod p²  -  1) / p`, the `L` function from the Okamoto-Uchiyama
/// paper, evaluated on a residue already reduced mod `p²`.
fn lx(x: &BigUint, p: &BigUint) -> BigUint {
    (x - BigUint::one()) / p
}

impl Scheme for OkamotoUchiyama {
    fn kind(&self) -> SchemeKind {
        SchemeKind::OkamotoUchiyama
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let third = (config.key_size / 3).max(16);
        for _ in 0..config.max_tries {
            let p = match random_prime(third, third + 8, rng) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let q = match random_prime(third, third + 8, rng) {
                Ok(q) => q,
                Err(_) => continue,
            };
            if p == q {
                continue;
            }
            let p2 = &p * &p;
            let n = &p2 * &q;

            let Some(g) = (0..100)
                .map(|_| random_below(&n, rng))
                .find(|g| is_valid_generator(g, &p, &p2))
            else {
                continue;
            };
            let h = core_err(mod_pow(
                &num_bigint::BigInt::from(g.clone()),
                &num_bigint::BigInt::from(n.clone()),
                &num_bigint::BigInt::from(n.clone()),
            ))?
            .magnitude()
            .clone();

            return Ok(KeyMaterial {
                kind: SchemeKind::OkamotoUchiyama,
                public: PublicKey::OkamotoUchiyama { n, g, h },
                private: Some(PrivateKey::OkamotoUchiyama { p, q }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        // p is secret for Okamoto-Uchiyama (it's a nontrivial factor of
        // `n`); unlike every other scheme's `plaintext_modulo`, recovering
        // it needs the private key. `original_source` mirrors this: its
        // `encrypt` only range-checks against `p` "if you have" the private
        // key (see `encrypt` below), and skips the check otherwise.
        let Some(PrivateKey::OkamotoUchiyama { p, .. }) = &key.private else {
            return Err(self.missing_key("plaintext_modulo", "private"));
        };
        Ok(p.clone())
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::OkamotoUchiyama { n, .. } => Ok(n.clone()),
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
        let PublicKey::OkamotoUchiyama { n, g, h } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        // Matches `original_source`: "having private key is not a must to
        // encrypt but still if you have [it, range-check against p]".
        let m = match self.plaintext_modulo(key) {
            Ok(p) if m >= &p => {
                let reduced = m % &p;
                reporter.note(Event::PlaintextReduced {
                    source: self.name(),
                    original: m.to_string(),
                    reduced: reduced.to_string(),
                    modulo: p.to_string(),
                });
                reduced
            }
            _ => m.clone(),
        };
        let r = random_below(n, rng);
        let gm = core_err(mod_pow(
            &num_bigint::BigInt::from(g.clone()),
            &num_bigint::BigInt::from(m),
            &num_bigint::BigInt::from(n.clone()),
        ))?;
        let hr = core_err(mod_pow(
            &num_bigint::BigInt::from(h.clone()),
            &num_bigint::BigInt::from(r),
            &num_bigint::BigInt::from(n.clone()),
        ))?;
        let c = (gm.magnitude() * hr.magnitude()) % n;
        Ok(Ciphertext::Integer(c))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::OkamotoUchiyama { g, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::OkamotoUchiyama { p, .. }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let p2 = p * p;
        let p_minus_one = p - BigUint::one();

        let c_pow = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(p_minus_one.clone()),
            &num_bigint::BigInt::from(p2.clone()),
        ))?
        .magnitude()
        .clone();
        let g_pow = core_err(mod_pow(
            &num_bigint::BigInt::from(g.clone()),
            &num_bigint::BigInt::from(p_minus_one),
            &num_bigint::BigInt::from(p2.clone()),
        ))?
        .magnitude()
        .clone();

        let l_c = lx(&c_pow, p);
        let l_g = lx(&g_pow, p);
        let l_g_inv = core_err(mod_inv(
            &num_bigint::BigInt::from(l_g),
            &num_bigint::BigInt::from(p.clone()),
        ))?;
        Ok((l_c * l_g_inv.magnitude()).mod_floor(p))
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let n = self.ciphertext_modulo(key)?;
        let (Ciphertext::Integer(c1), Ciphertext::Integer(c2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Integer((c1 * c2).mod_floor(&n)))
    }

    fn multiply_by_constant(
        &self,
        key: &KeyMaterial,
        c: &Ciphertext,
        k: &BigUint,
        _rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        let n = self.ciphertext_modulo(key)?;
        let p = self.plaintext_modulo(key)?;
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= &p {
            let reduced = k % &p;
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
        let result = core_err(mod_pow(
            &num_bigint::BigInt::from(c.clone()),
            &num_bigint::BigInt::from(k),
            &num_bigint::BigInt::from(n),
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

/// `g^(p-1) mod p² != 1`, the condition spec.md §4.6 requires of a valid
/// Okamoto-Uchiyama generator (without it, `p` doesn't divide the order of
/// `g`'s image, and decryption's `L` function divides by zero's cousin: a
/// unit with no discrete-log content).
fn is_valid_generator(g: &BigUint, p: &BigUint, p2: &BigUint) -> bool {
    if g.is_multiple_of(p) {
        return false;
    }
    let p_minus_one = p - BigUint::one();
    g.modpow(&p_minus_one, p2) != BigUint::one()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_keys() -> KeyMaterial {
        let scheme = OkamotoUchiyama;
        let mut rng = ChaCha20Rng::seed_from_u64(51);
        let config = KeygenConfig {
            key_size: 96,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let scheme = OkamotoUchiyama;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(11u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = OkamotoUchiyama;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(3u32);
        let b = BigUint::from(4u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), &a + &b);
    }

    #[test]
    fn scalar_multiply_matches_repeated_addition() {
        let scheme = OkamotoUchiyama;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let m = BigUint::from(5u32);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        let scaled = scheme
            .multiply_by_constant(&keys, &c, &BigUint::from(3u32), &mut rng, &reporter)
            .unwrap();
        assert_eq!(scheme.decrypt(&keys, &scaled).unwrap(), BigUint::from(15u32));
    }
}
