//! Naccache-Stern (spec.md §4.2, §4.6): a generalisation of Benaloh over a
//! composite plaintext modulus `σ = ∏ pi` built from a small fixed prime
//! set. Decryption solves one small discrete log per prime in the set, then
//! recombines the per-prime remainders with the Chinese Remainder Theorem.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::One;
use phe_core::bigint::{factorint, gcd, is_probable_prime, mod_pow, random_prime, solve_crt};
use phe_core::{Event, Reporter};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::Error;
use crate::error::Result;
use crate::keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
use crate::scheme::{core_err, reencrypt_additive, Scheme};

/// Fixed small-prime set, matching `original_source`'s `prime_set = [3, 5,
/// 7, 11, 13, 17]` — the original's own `TODO: do something generic
/// instead of constant primes` stays a fixed set here too, since spec.md
/// §4.6 only asks for "a small-prime set (e.g. {3,5,7,11,13,17})", not a
/// parameterised one.
fn prime_set() -> Vec<BigUint> {
    [3u32, 5, 7, 11, 13, 17].into_iter().map(BigUint::from).collect()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NaccacheStern;

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

/// `(p-1)` divides by `pi`, `pi` coprime to `(p-1)/pi`, `pi` coprime to the
/// other factor's `q-1` — the per-prime condition spec.md's keygen
/// contract requires for each half of the prime set.
fn half_conditions(half: &[BigUint], minus_one: &BigUint, other_minus_one: &BigUint) -> bool {
    half.iter().all(|pi| {
        minus_one.is_multiple_of(pi)
            && gcd(&BigInt::from(pi.clone()), &BigInt::from(minus_one / pi)) == BigInt::one()
            && gcd(&BigInt::from(pi.clone()), &BigInt::from(other_minus_one.clone())) == BigInt::one()
    })
}

impl Scheme for NaccacheStern {
    fn kind(&self) -> SchemeKind {
        SchemeKind::NaccacheStern
    }

    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial> {
        let primes = prime_set();
        let half_len = primes.len() / 2;
        let u: BigUint = primes[..half_len].iter().product();
        let v: BigUint = primes[half_len..].iter().product();
        let sigma = &u * &v;

        let bits = config.key_size.max(16);
        for _ in 0..config.max_tries {
            let a = match random_prime(bits, bits + 8, rng) {
                Ok(a) => a,
                Err(_) => continue,
            };
            let Some(b) = random_prime_below(&a, &BigUint::from(3u8), rng) else {
                continue;
            };

            let p = (&a * &u * BigUint::from(2u8)) + BigUint::one();
            let q = (&b * &v * BigUint::from(2u8)) + BigUint::one();
            if !is_probable_prime(&p, rng) || !is_probable_prime(&q, rng) {
                continue;
            }
            if p == q {
                continue;
            }

            let n = &p * &q;
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());

            if !phi.is_multiple_of(&sigma) {
                continue;
            }
            if gcd(&BigInt::from(sigma.clone()), &BigInt::from(&phi / &sigma)) != BigInt::one() {
                continue;
            }

            let p_minus_one = &p - BigUint::one();
            let q_minus_one = &q - BigUint::one();
            if !half_conditions(&primes[..half_len], &p_minus_one, &q_minus_one) {
                continue;
            }
            if !half_conditions(&primes[half_len..], &q_minus_one, &p_minus_one) {
                continue;
            }

            let Some(g) = find_generator(&n, &phi, &primes, rng) else {
                continue;
            };

            return Ok(KeyMaterial {
                kind: SchemeKind::NaccacheStern,
                public: PublicKey::NaccacheStern { n, g, sigma },
                private: Some(PrivateKey::NaccacheStern {
                    p,
                    q,
                    phi,
                    prime_set: primes,
                }),
            });
        }
        Err(Error::KeyGenFailure {
            scheme: self.name(),
            tries: config.max_tries,
        })
    }

    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::NaccacheStern { sigma, .. } => Ok(sigma.clone()),
            _ => Err(self.missing_key("plaintext_modulo", "public")),
        }
    }

    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint> {
        match &key.public {
            PublicKey::NaccacheStern { n, .. } => Ok(n.clone()),
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
        let PublicKey::NaccacheStern { n, g, sigma } = &key.public else {
            return Err(self.missing_key("encrypt", "public"));
        };
        let m = if m >= sigma {
            let reduced = m % sigma;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: m.to_string(),
                reduced: reduced.to_string(),
                modulo: sigma.to_string(),
            });
            reduced
        } else {
            m.clone()
        };
        let r = random_below(n, rng);
        let rs = core_err(mod_pow(&BigInt::from(r), &BigInt::from(sigma.clone()), &BigInt::from(n.clone())))?;
        let gm = core_err(mod_pow(&BigInt::from(g.clone()), &BigInt::from(m), &BigInt::from(n.clone())))?;
        let c = (rs.magnitude() * gm.magnitude()) % n;
        Ok(Ciphertext::Integer(c))
    }

    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint> {
        let PublicKey::NaccacheStern { n, g, .. } = &key.public else {
            return Err(self.missing_key("decrypt", "public"));
        };
        let Some(PrivateKey::NaccacheStern { phi, prime_set, .. }) = &key.private else {
            return Err(self.missing_key("decrypt", "private"));
        };
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("decrypt (ciphertext shape mismatch)"));
        };

        let mut pairs = Vec::with_capacity(prime_set.len());
        for prime in prime_set {
            let exp = phi / prime;
            let ci = c.modpow(&exp, n);

            let bound = prime * prime;
            let mut j = BigUint::from(0u8);
            let mut found = None;
            while &j <= &bound {
                let step = (&j * phi) / prime;
                if ci == g.modpow(&step, n) {
                    found = Some(j.clone());
                    break;
                }
                j += BigUint::one();
            }
            let Some(j) = found else {
                return Err(Error::DecryptionFailure {
                    scheme: self.name(),
                    bound: bound.to_string(),
                });
            };
            pairs.push((BigInt::from(j), BigInt::from(prime.clone())));
        }

        let m = core_err(solve_crt(&pairs))?;
        Ok(m.magnitude().clone())
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
        let sigma = self.plaintext_modulo(key)?;
        let Ciphertext::Integer(c) = c else {
            return Err(self.unsupported("multiply_by_constant (ciphertext shape mismatch)"));
        };
        let k = if k >= &sigma {
            let reduced = k % &sigma;
            reporter.note(Event::PlaintextReduced {
                source: self.name(),
                original: k.to_string(),
                reduced: reduced.to_string(),
                modulo: sigma.to_string(),
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

fn random_prime_below(bound: &BigUint, floor: &BigUint, rng: &mut dyn RngCore) -> Option<BigUint> {
    for _ in 0..2000 {
        let candidate = random_below(bound, rng);
        if &candidate >= floor && &candidate < bound && is_probable_prime(&candidate, rng) {
            return Some(candidate);
        }
    }
    None
}

/// Draws a generator `g` satisfying every condition spec.md §4.6 lists:
/// coprime to `n`, order `phi/4`, and not a `pi`-th power for any prime in
/// the set (checked both at the whole-set level and, per
/// `original_source`'s belt-and-suspenders extra loop, via each `pi`'s own
/// prime factorisation — which for a prime `pi` is just `{pi}` again, but
/// mirrors the original's structure).
fn find_generator(n: &BigUint, phi: &BigUint, primes: &[BigUint], rng: &mut dyn RngCore) -> Option<BigUint> {
    let four = BigUint::from(4u8);
    'candidates: for _ in 0..500 {
        let g = random_below(n, rng);
        if gcd(&BigInt::from(g.clone()), &BigInt::from(n.clone())) != BigInt::one() {
            continue;
        }
        for pi in primes {
            let exp = phi / pi;
            if g.modpow(&exp, n) == BigUint::one() {
                continue 'candidates;
            }
        }
        if phi.is_multiple_of(&four) {
            let exp = phi / &four;
            if g.modpow(&exp, n) != BigUint::one() {
                continue;
            }
        } else {
            continue;
        }
        for pi in primes {
            for prime_factor in factorint(pi).keys() {
                let exp = phi / prime_factor;
                if g.modpow(&exp, n) == BigUint::one() {
                    continue 'candidates;
                }
            }
        }
        return Some(g);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_keys() -> KeyMaterial {
        let scheme = NaccacheStern;
        let mut rng = ChaCha20Rng::seed_from_u64(71);
        let config = KeygenConfig {
            key_size: 48,
            max_tries: 200_000,
            ..KeygenConfig::default()
        };
        scheme.keygen(&config, &mut rng).unwrap()
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let scheme = NaccacheStern;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let m = BigUint::from(1234u32) % scheme.plaintext_modulo(&keys).unwrap();
        let c = scheme.encrypt(&keys, &m, &mut rng, &reporter).unwrap();
        assert_eq!(scheme.decrypt(&keys, &c).unwrap(), m);
    }

    #[test]
    fn add_is_homomorphic() {
        let scheme = NaccacheStern;
        let keys = small_keys();
        let reporter = phe_core::NoopReporter;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let a = BigUint::from(10u32);
        let b = BigUint::from(20u32);
        let ca = scheme.encrypt(&keys, &a, &mut rng, &reporter).unwrap();
        let cb = scheme.encrypt(&keys, &b, &mut rng, &reporter).unwrap();
        let sum = scheme.add(&keys, &ca, &cb).unwrap();
        assert_eq!(scheme.decrypt(&keys, &sum).unwrap(), &a + &b);
    }
}
