//! The `Scheme` capability trait (spec.md §9's "capability record" — a
//! scheme-kind tag plus function slots for keygen/encrypt/decrypt/add/
//! multiply/xor/scalar/reenc, with unsupported slots failing rather than
//! requiring inheritance from a common base class).

use num_bigint::BigUint;
use phe_core::{Reporter, Result as CoreResult};
use rand_core::RngCore;

use crate::ciphertext::Ciphertext;
use crate::error::{Error, Result};
use crate::keys::{KeyMaterial, KeygenConfig, SchemeKind};

/// Uniform interface implemented by all nine cryptosystems (spec.md §4.6).
///
/// Every method takes the [`KeyMaterial`] it needs and returns a typed
/// error rather than panicking: `encrypt`/`add`/`multiply`/`xor`/
/// `multiply_by_constant`/`reencrypt` all fail with
/// [`Error::UnsupportedOperation`] by default, so a scheme only has to
/// override the handful of operations spec.md's capability table actually
/// grants it.
pub trait Scheme: Send + Sync {
    /// Which scheme this is.
    fn kind(&self) -> SchemeKind;

    /// Scheme name, for error messages.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Runs the scheme's probabilistic keygen loop, bounded by
    /// `config.max_tries`.
    fn keygen(&self, config: &KeygenConfig, rng: &mut dyn RngCore) -> Result<KeyMaterial>;

    /// The group plaintexts live in (spec.md §3).
    fn plaintext_modulo(&self, key: &KeyMaterial) -> Result<BigUint>;

    /// The group ciphertexts live in (spec.md §3).
    fn ciphertext_modulo(&self, key: &KeyMaterial) -> Result<BigUint>;

    /// Encrypts `m`, which the caller must already have reduced into
    /// `[0, plaintext_modulo)` (the range-reduction policy itself lives one
    /// layer up, in [`crate::CiphertextHandle`] and the Facade, which is
    /// where `Reporter` events about out-of-range inputs are emitted).
    fn encrypt(
        &self,
        key: &KeyMaterial,
        m: &BigUint,
        rng: &mut dyn RngCore,
        reporter: &dyn Reporter,
    ) -> Result<Ciphertext>;

    /// Decrypts `c`, requiring the private key.
    fn decrypt(&self, key: &KeyMaterial, c: &Ciphertext) -> Result<BigUint>;

    /// Homomorphic addition: `decrypt(add(E(a), E(b))) = a + b mod plaintext_modulo`.
    fn add(&self, _key: &KeyMaterial, _c1: &Ciphertext, _c2: &Ciphertext) -> Result<Ciphertext> {
        Err(self.unsupported("add"))
    }

    /// Homomorphic multiplication: `decrypt(multiply(E(a), E(b))) = a * b mod plaintext_modulo`.
    fn multiply(&self, _key: &KeyMaterial, _c1: &Ciphertext, _c2: &Ciphertext) -> Result<Ciphertext> {
        Err(self.unsupported("multiply"))
    }

    /// Scalar multiplication by a known plaintext constant.
    fn multiply_by_constant(
        &self,
        _key: &KeyMaterial,
        _c: &Ciphertext,
        _k: &BigUint,
        _rng: &mut dyn RngCore,
        _reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        Err(self.unsupported("scalar multiplication"))
    }

    /// Bit-wise XOR (Goldwasser-Micali only).
    fn xor(&self, _key: &KeyMaterial, _c1: &Ciphertext, _c2: &Ciphertext) -> Result<Ciphertext> {
        Err(self.unsupported("xor"))
    }

    /// Re-randomises `c` without changing the plaintext it decrypts to.
    /// Default implementation is spec.md §4.6's generic definition:
    /// `add(c, encrypt(0))` for additive schemes, `multiply(c, encrypt(1))`
    /// for multiplicative ones. Schemes override this only when they need a
    /// different identity element (EC-ElGamal and Goldwasser-Micali don't
    /// support it at all and keep the default `Err`).
    fn reencrypt(
        &self,
        _key: &KeyMaterial,
        _c: &Ciphertext,
        _rng: &mut dyn RngCore,
        _reporter: &dyn Reporter,
    ) -> Result<Ciphertext> {
        Err(self.unsupported("re-encryption"))
    }

    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            scheme: self.name(),
            operation,
        }
    }

    fn missing_key(&self, operation: &'static str, which: &'static str) -> Error {
        Error::MissingKey {
            scheme: self.name(),
            operation,
            which,
        }
    }
}

/// Lifts a [`phe_core::Error`] into this crate's [`Error`] inline, for
/// scheme implementations that call into `phe_core` directly.
pub(crate) fn core_err<T>(r: CoreResult<T>) -> Result<T> {
    r.map_err(Error::from)
}

/// Helper shared by every additive scheme's `reencrypt`: `add(c, E(0))`.
pub(crate) fn reencrypt_additive(
    scheme: &dyn Scheme,
    key: &KeyMaterial,
    c: &Ciphertext,
    rng: &mut dyn RngCore,
    reporter: &dyn Reporter,
) -> Result<Ciphertext> {
    let zero = BigUint::from(0u8);
    let blinding = scheme.encrypt(key, &zero, rng, reporter)?;
    scheme.add(key, c, &blinding)
}

/// Helper shared by every multiplicative scheme's `reencrypt`: `multiply(c, E(1))`.
pub(crate) fn reencrypt_multiplicative(
    scheme: &dyn Scheme,
    key: &KeyMaterial,
    c: &Ciphertext,
    rng: &mut dyn RngCore,
    reporter: &dyn Reporter,
) -> Result<Ciphertext> {
    let one = BigUint::from(1u8);
    let blinding = scheme.encrypt(key, &one, rng, reporter)?;
    scheme.multiply(key, c, &blinding)
}
