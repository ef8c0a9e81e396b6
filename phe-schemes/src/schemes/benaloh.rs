//! Benaloh (spec.md §4.2, §4.6): additive homomorphism over `ℤ/r` for a
//! small prime `r` dividing `p-1`. Decryption is a brute-force discrete log
//! bounded by `r`, which is the reason spec.md recommends a much smaller
//! key size for this scheme than for Paillier or RSA.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use phe_core::bigint::{factorint, gcd, is_probable_prime, mod_pow, next_prime, random_prime};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, reencrypt_additive, Scheme};

#[derive(Debug, Default, Clone, Copy)]
pub struct Benaloh;

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

/// Draws a random prime strictly below `bound` (used for Benaloh's `q <
/// p`), by repeated rejection sampling rather than fixing a bit range —
/// `bound` isn't a power of two, so `random_prime`'s bit-range API doesn't
/// apply directly.
fn random_prime_below(bound: &BigUint, floor: &BigUint, rng: &mut dyn RngCore) -> Option<BigUint> {
    for _ in 0..2000 {
        let candidate = random_below(bound, rng);
        if &candidate >= floor && &candidate < bound && is_probable_prime(&candidate, rng) {
            return Some(candidate);
        }
    }
    None
}

impl Scheme for Benaloh {
    fn kind(&self) -> SchemeKind {
        SchemeKind::Benaloh
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let bits = config.key_size.max(16);
        'outer: for _ in 0..config.max_tries {
            // r is either nextprime(plaintext_limit) (spec.md §4.6's
            // documented override) or derived from a freshly drawn p, the
            // same way `original_source` whittles r down from p-1.
            let p = match random_prime(bits, bits + 8, rng) {
                Ok(p) => p,
                Err(_) => continue,
            };
            if p <= BigUint::from(4u8) {
                continue;
            }
            let Some(q) = random_prime_below(&p, &BigUint::from(3u8), rng) else {
                continue;
            };
            if p == q {
                continue;
            }

            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());

            let r = if let Some(limit) = &config.plaintext_limit {
                next_prime(limit, rng)
            } else {
                let mut r = &p - BigUint::one();
                loop {
                    let g = gcd(
                        &BigInt::from(&q - BigUint::one()),
                        &BigInt::from(r.clone()),
                    )
                    .magnitude()
                    .clone();
                    if g == BigUint::one() {
                        break;
                    }
                    r /= &g;
                }
                r
            };

            if !(&p - BigUint::one()).is_multiple_of(&r) {
                continue;
            }
            let cofactor = (&p - BigUint::one()) / &r;
            if gcd(&BigInt::from(r.clone()), &BigInt::from(cofactor)) != BigInt::one() {
                continue;
            }
            if gcd(&BigInt::from(r.clone()), &BigInt::from(&q - BigUint::one())) != BigInt::one() {
                continue;
            }

            for _ in 0..200 {
                let y = random_below(&n, rng);
                if gcd(&BigInt::from(y.clone()), &BigInt::from(n.clone())) != BigInt::one() {
                    continue;
                }

                let prime_factors = factorint(&r);
                let decryption_guaranteed = prime_factors.keys().all(|pf| {
                    let exp = &phi / pf;
                    let check = y.modpow(&exp, &n);
                    check != BigUint::one()
                });
                if !decryption_guaranteed {
                    continue;
                }

                let exp = &phi / &r;
                let x = y.modpow(&exp, &n);
                if x == BigUint::one() {
                    continue;
                }

                return Ok(KeyMaterial {
                    kind: SchemeKind::Benaloh,
                    public: PublicKey::Benaloh { n, y, r },
                    private: Some(PrivateKey::Benaloh { p, q, phi, x }),
                });
            }
            continue 'outer;
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::Benaloh { r, .. } => Ok(r.clone()),
            _ => Err(self.missing_key("plaintext_modulo", "public")),
        }
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::Benaloh { n, .. } => Ok(n.clone()),
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
        let PublicKey::Benaloh { n, y, r } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let m = if m >= r {
            let reduced = m % r;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: m.to_string(),
                reduced: reduced.to_string(),
                modulo: r.to_string(),
            });
            reduced
        } else {
            m.clone()
        };
        let u = random_below(n, rng);
        let ym = core_err(mod_pow(
            &BigInt::from(y.clone()),
            &BigInt::from(m),
            &BigInt::from(n.clone()),
        ))?;
        let ur = core_err(mod_pow(
            &BigInt::from(u),
            &BigInt::from(r.clone()),
            &BigInt::from(n.clone()),
        ))?;
        let c = (ym.magnitude() * ur.magnitude()) % n;
        Ok(Ciphertext::Integer(c))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::Benaloh { n, r, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::Benaloh { phi, x, .. }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };
        let exp = phi / r;
        let a = c.modpow(&exp, n);

        let mut power = BigUint::one();
        let mut md = BigUint::zero();
        loop {
            if power == a {
                return Ok(md);
            }
            md += BigUint::one();
            if &md > r {
                return Err(Error::DecryptionFailure {
                    scheme: self.name(),
                    bound: r.to_string(),
                });
            }
            power = (&power * x) % n;
        }
    }

    fn add(&self, key: &KeyMaterial, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext> {
        let n = self.ciphertext_modulo(key)?;
        let (Ciphertext::Integer(c1), Ciphertext::Integer(c2)) = (c1, c2) else {
            return Err(self.unsupported("add (ciphertext shape mismatch)"));
        };
        Ok(Ciphertext::Integer((c1 * c2) % n))
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
        let r = self.plaintext_modulo(key)?;
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= &r {
            let reduced = k % &r;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: k.to_string(),
                reduced: reduced.to_string(),
                modulo: r.to_string(),
            });
            reduced
        } else {
            k.clone()
        };
        let result = core_err(mod_pow(&BigInt::from(c.clone()), &BigInt::from(k), &BigInt::from(n)))?;
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
        let scheme = Benaloh;
        let mut rng = ChaCha20Rng::seed_from_u64(61);
        let config = KeygenConfig {
            key_size: 24,
            max_tries: 50_000,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let scheme = Benaloh;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let r = scheme.plaintext_modulo(&keys).unwrap();
        let m = BigUint::from(1u8) % &r;
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    /// `decrypt`'s brute-force discrete-log search runs up to `r`; `m = 1`
    /// only exercises its first couple of iterations, so this walks it
    /// almost all the way to the end of its search bound instead.
    #[test]
    fn decrypt_near_top_of_search_range() {
        let scheme = Benaloh;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let r = scheme.plaintext_modulo(&keys).unwrap();
        let m = &r - BigUint::from(2u8);
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = Benaloh;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let r = scheme.plaintext_modulo(&keys).unwrap();
        // a is close to r/2 so decryption of both operands and the sum
        // walks well past the search loop's first few candidates.
        let a = &r / BigUint::from(2u8) - BigUint::from(1u8);
        let b = BigUint::from(3u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), (&a + &b) % &r);
    }
}
