//! [`Ciphertext`] (spec.md §3) and [`CiphertextHandle`] (spec.md §4.7), the
//! opaque wrapper exposing `+`, `*` and `^` over a scheme's native
//! ciphertext shape.

use std::ops::{Add, BitXor, Mul};
use std::sync::Arc;

use num_bigint::BigUint;
use phe_core::curve::Point;
use phe_core::{NoopReporter, Reporter};
use rand::rngs::ThreadRng;

use crate::error::Result;
use crate::keys::KeyMaterial;
use crate::scheme::Scheme;

/// The scheme's native ciphertext value (spec.md §3): a single integer for
/// RSA/Paillier/Damgård-Jurik/OU/Benaloh/Naccache-Stern, a pair for the two
/// ElGamal variants, a pair of curve points for EC-ElGamal, or one integer
/// per plaintext bit for Goldwasser-Micali.
#[derive(Debug, Clone, PartialEq)]
pub enum Ciphertext {
    /// Single modular integer.
    Integer(BigUint),
    /// `(c1, c2)` pair, as produced by both ElGamal variants.
    Pair(BigUint, BigUint),
    /// `(c1, c2)` curve-point pair, as produced by EC-ElGamal.
    EcPair(Point, Point),
    /// One integer per plaintext bit, MSB first (Goldwasser-Micali).
    Bits(Vec<BigUint>),
}

/// An opaque, scheme-tagged ciphertext handle (spec.md §4.7).
///
/// `+`, `*` (handle × handle, handle × integer), `^` all re-check that the
/// public key is present and dispatch to the underlying scheme; every
/// operator returns a fresh handle tagged with the same scheme and keys.
/// `Mul<f64>` can't be expressed as a blanket `std::ops::Mul` impl across
/// this handle's dynamic scheme boundary without running into the orphan
/// rule, so float scalar multiplication is the named method
/// [`CiphertextHandle::mul_scalar_float`] instead (spec.md §9 explicitly
/// allows named methods in place of operator overloading).
#[derive(Clone)]
pub struct CiphertextHandle {
    scheme: Arc<dyn Scheme>,
    keys: Arc<KeyMaterial>,
    reporter: Arc<dyn Reporter>,
    ciphertext: Ciphertext,
}

impl std::fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiphertextHandle")
            .field("scheme", &self.scheme.name())
            .field("ciphertext", &self.ciphertext)
            .finish()
    }
}

impl CiphertextHandle {
    /// Wraps a raw ciphertext value under a scheme and key pair. Used both
    /// by `Scheme::encrypt` call sites and by the Facade's
    /// `create_ciphertext_obj` (wrapping an externally computed value back
    /// into a handle, spec.md §4.9).
    pub fn new(
        scheme: Arc<dyn Scheme>,
        keys: Arc<KeyMaterial>,
        reporter: Arc<dyn Reporter>,
        ciphertext: Ciphertext,
    ) -> Self {
        CiphertextHandle {
            scheme,
            keys,
            reporter,
            ciphertext,
        }
    }

    /// The wrapped native ciphertext value.
    pub fn value(&self) -> &Ciphertext {
        &self.ciphertext
    }

    /// The key material this handle is tagged with.
    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// The scheme this handle is tagged with. Exposed so higher layers
    /// (`phe-tensor`) can query scheme-level facts such as
    /// `plaintext_modulo` without re-threading a separate scheme handle.
    pub fn scheme(&self) -> &dyn Scheme {
        self.scheme.as_ref()
    }

    /// The diagnostic sink this handle reports through.
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    fn require_public_key(&self, operation: &'static str) -> Result<()> {
        // KeyMaterial::public is always present by construction (see its
        // doc comment), so this only exists to keep the "re-checks that the
        // public key is present" contract explicit and to give operator
        // call sites one place to extend if that invariant ever loosens.
        let _ = operation;
        Ok(())
    }

    fn with_ciphertext(&self, ciphertext: Ciphertext) -> CiphertextHandle {
        CiphertextHandle {
            scheme: self.scheme.clone(),
            keys: self.keys.clone(),
            reporter: self.reporter.clone(),
            ciphertext,
        }
    }

    /// Homomorphic addition.
    pub fn add(&self, other: &CiphertextHandle) -> Result<CiphertextHandle> {
        self.require_public_key("add")?;
        let result = self.scheme.add(&self.keys, &self.ciphertext, &other.ciphertext)?;
        Ok(self.with_ciphertext(result))
    }

    /// Homomorphic multiplication (handle × handle).
    pub fn mul(&self, other: &CiphertextHandle) -> Result<CiphertextHandle> {
        self.require_public_key("multiply")?;
        let result = self
            .scheme
            .multiply(&self.keys, &self.ciphertext, &other.ciphertext)?;
        Ok(self.with_ciphertext(result))
    }

    /// Scalar multiplication by a known plaintext integer constant.
    pub fn mul_scalar(&self, k: &BigUint) -> Result<CiphertextHandle> {
        self.require_public_key("scalar multiplication")?;
        let mut rng = ThreadRng::default();
        let result = self
            .scheme
            .multiply_by_constant(&self.keys, &self.ciphertext, k, &mut rng, self.reporter.as_ref())?;
        Ok(self.with_ciphertext(result))
    }

    /// Scalar multiplication by a non-negative float constant, normalised
    /// through `phe_core::fixed_point` first (spec.md §4.7: "`*` with a
    /// float first normalises via FixedPoint").
    pub fn mul_scalar_float(&self, k: f64, precision: u32) -> Result<CiphertextHandle> {
        let modulo = self.scheme.plaintext_modulo(&self.keys)?;
        let normalized = phe_core::fixed_point::normalize_input(
            &phe_core::fixed_point::Numeric::Float(k),
            &modulo,
            precision,
        )?;
        self.mul_scalar(&normalized)
    }

    /// Bit-wise XOR (Goldwasser-Micali only).
    pub fn xor(&self, other: &CiphertextHandle) -> Result<CiphertextHandle> {
        self.require_public_key("xor")?;
        let result = self.scheme.xor(&self.keys, &self.ciphertext, &other.ciphertext)?;
        Ok(self.with_ciphertext(result))
    }

    /// Re-randomises this ciphertext without changing its plaintext.
    pub fn reencrypt(&self) -> Result<CiphertextHandle> {
        let mut rng = ThreadRng::default();
        let result = self
            .scheme
            .reencrypt(&self.keys, &self.ciphertext, &mut rng, self.reporter.as_ref())?;
        if result == self.ciphertext {
            self.reporter.note(phe_core::Event::ReencryptionNoOp {
                source: self.scheme.name(),
            });
        }
        Ok(self.with_ciphertext(result))
    }

    /// Decrypts this ciphertext, requiring the private key.
    pub fn decrypt(&self) -> Result<BigUint> {
        if self.keys.private.is_none() {
            return Err(self.scheme.missing_key("decrypt", "private"));
        }
        self.scheme.decrypt(&self.keys, &self.ciphertext)
    }
}

impl Add for &CiphertextHandle {
    type Output = Result<CiphertextHandle>;

    fn add(self, rhs: &CiphertextHandle) -> Self::Output {
        CiphertextHandle::add(self, rhs)
    }
}

impl Mul for &CiphertextHandle {
    type Output = Result<CiphertextHandle>;

    fn mul(self, rhs: &CiphertextHandle) -> Self::Output {
        CiphertextHandle::mul(self, rhs)
    }
}

impl Mul<&BigUint> for &CiphertextHandle {
    type Output = Result<CiphertextHandle>;

    fn mul(self, rhs: &BigUint) -> Self::Output {
        CiphertextHandle::mul_scalar(self, rhs)
    }
}

impl BitXor for &CiphertextHandle {
    type Output = Result<CiphertextHandle>;

    fn bitxor(self, rhs: &CiphertextHandle) -> Self::Output {
        CiphertextHandle::xor(self, rhs)
    }
}

/// Convenience for call sites that don't care about custom reporting.
pub fn noop_reporter() -> Arc<dyn Reporter> {
    Arc::new(NoopReporter)
}
