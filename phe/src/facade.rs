//! [`Facade`] (spec.md §4.9): the user-facing orchestrator that selects a
//! scheme by name, routes plain-vs-tensor inputs to the right encoder, and
//! gates every operation on key availability.

use std::path::Path;
use std::sync::Arc;

use num_bigint::{BigInt, BigUint};
use phe_core::{LogReporter, NoopReporter, Reporter};
use phe_schemes::{scheme_for, Ciphertext, CiphertextHandle, KeyMaterial, KeygenConfig, Scheme, SchemeKind};
use phe_tensor::{EncryptedTensor, Numeric, TensorEncoder};
use rand::rngs::ThreadRng;

use crate::error::{Error, Result};
use crate::keyfile;

/// A plaintext at the Facade boundary: an integer, a float, or a list of
/// either (spec.md §9's "dynamic typing of plaintext/ciphertext" tagged
/// union). `list` dispatches to [`phe_tensor::TensorEncoder`]; `int`/`float`
/// stay scalar.
#[derive(Debug, Clone)]
pub enum Plaintext {
    /// A scalar integer, positive, negative or zero.
    Int(BigInt),
    /// A scalar non-negative float (negative floats fail at
    /// [`Facade::encrypt`] with [`phe_core::Error::UnsupportedInput`]).
    Float(f64),
    /// A tensor: one [`Numeric`] per element.
    List(Vec<Numeric>),
}

impl From<i64> for Plaintext {
    fn from(v: i64) -> Self {
        Plaintext::Int(BigInt::from(v))
    }
}

impl From<BigInt> for Plaintext {
    fn from(v: BigInt) -> Self {
        Plaintext::Int(v)
    }
}

impl From<f64> for Plaintext {
    fn from(v: f64) -> Self {
        Plaintext::Float(v)
    }
}

impl From<Vec<i64>> for Plaintext {
    fn from(v: Vec<i64>) -> Self {
        Plaintext::List(v.into_iter().map(|x| Numeric::from(x)).collect())
    }
}

impl From<Vec<f64>> for Plaintext {
    fn from(v: Vec<f64>) -> Self {
        Plaintext::List(v.into_iter().map(Numeric::from).collect())
    }
}

impl From<Vec<Numeric>> for Plaintext {
    fn from(v: Vec<Numeric>) -> Self {
        Plaintext::List(v)
    }
}

/// What [`Facade::encrypt`] returns: a single scalar handle, or a whole
/// tensor (spec.md §4.9: `encrypt(x) -> CiphertextHandle or
/// EncryptedTensor`).
#[derive(Debug, Clone)]
pub enum Encrypted {
    /// A single scheme-native ciphertext.
    Scalar(CiphertextHandle),
    /// A tensor of [`phe_tensor::Fraction`]s.
    Tensor(EncryptedTensor),
}

impl Encrypted {
    /// The wrapped scalar handle, if this is [`Encrypted::Scalar`].
    pub fn as_scalar(&self) -> Result<&CiphertextHandle> {
        match self {
            Encrypted::Scalar(handle) => Ok(handle),
            Encrypted::Tensor(_) => Err(Error::NotAScalar { operation: "as_scalar" }),
        }
    }

    /// The wrapped tensor, if this is [`Encrypted::Tensor`].
    pub fn as_tensor(&self) -> Result<&EncryptedTensor> {
        match self {
            Encrypted::Tensor(tensor) => Ok(tensor),
            Encrypted::Scalar(_) => Err(Error::NotAScalar { operation: "as_tensor" }),
        }
    }
}

/// What [`Facade::decrypt`] returns: a single integer, or a list of floats
/// recovered from a tensor (spec.md §4.9: `decrypt(c) -> integer | float |
/// list of numbers`; a scalar Ciphertext always decrypts to its raw
/// plaintext-group residue — `original_source`'s own `decrypt` never
/// reconstructs a float from a scalar ciphertext either, since a bare
/// `CiphertextHandle` carries no memory of the divisor a float scalar was
/// folded through).
#[derive(Debug, Clone, PartialEq)]
pub enum Decrypted {
    /// A scalar plaintext-group residue.
    Int(BigUint),
    /// A tensor's elements, recovered as approximate floats.
    List(Vec<f64>),
}

/// Tuning knobs for [`Facade::construct`] (spec.md §4.9's constructor
/// argument list).
#[derive(Debug, Clone, Default)]
pub struct FacadeOptions {
    /// Key size in bits. Defaults to [`Facade::recommend_key_size`] for the
    /// chosen scheme when omitted, matching `original_source`'s own
    /// `__build_cryptosystem` default.
    pub key_size: Option<u32>,
    /// Pre-built key material (skips keygen entirely).
    pub keys: Option<KeyMaterial>,
    /// A JSON key file to restore from (skips keygen; mutually exclusive
    /// with `keys`, which takes priority if both are set).
    pub key_file: Option<std::path::PathBuf>,
    /// Fixed-point precision for tensor and float scalar encoding.
    /// Defaults to 5, spec.md §4.9's documented default.
    pub precision: Option<u32>,
    /// Curve form, EC-ElGamal only (`None` defaults to `"weierstrass"`).
    pub form: Option<String>,
    /// Curve name, EC-ElGamal only (`None` selects the form's default).
    pub curve: Option<String>,
    /// Override for Benaloh's `r` / Naccache-Stern's `sigma` upper bound.
    pub plaintext_limit: Option<BigUint>,
    /// Keygen retry budget. Defaults to 10 000, spec.md §4.6/§7.
    pub max_tries: Option<u32>,
    /// Diagnostic sink. Defaults to a no-op reporter; pass
    /// [`phe_core::LogReporter`] to forward events to the `log` crate.
    pub reporter: Option<Arc<dyn Reporter>>,
}

/// The user-facing orchestrator (spec.md §4.9). Holds one scheme, one key
/// pair, one reporter and one fixed-point precision; every operation routes
/// through this fixed configuration.
pub struct Facade {
    kind: SchemeKind,
    scheme: Arc<dyn Scheme>,
    keys: Arc<KeyMaterial>,
    reporter: Arc<dyn Reporter>,
    precision: u32,
}

/// Scheme-appropriate default key sizes (spec.md §4.9's
/// `recommend_key_size`), restored from `original_source/lightphe/__init__.py`'s
/// `recommend_key_size` — the distilled spec.md never states this table, but
/// every end-to-end scenario in spec.md §8 constructs a scheme without
/// always giving an explicit key size, so the Facade needs one.
pub fn recommend_key_size(scheme_name: &str) -> Result<u32> {
    let kind = SchemeKind::from_name(scheme_name).ok_or_else(|| Error::UnsupportedScheme {
        name: scheme_name.to_string(),
    })?;
    Ok(match kind {
        SchemeKind::Rsa => 1024,
        SchemeKind::ElGamal => 1024,
        SchemeKind::ExponentialElGamal => 1024,
        // 160-bit ECC is roughly equivalent to 1024-bit RSA.
        SchemeKind::EcElGamal => 160,
        SchemeKind::Paillier => 1024,
        SchemeKind::DamgardJurik => 1024,
        SchemeKind::OkamotoUchiyama => 1024,
        // n should be several hundred bits or more.
        SchemeKind::GoldwasserMicali => 100,
        // Benaloh and Naccache-Stern solve a discrete log during
        // decryption, so a small key is recommended.
        SchemeKind::Benaloh => 50,
        SchemeKind::NaccacheStern => 37,
    })
}

impl Facade {
    /// Builds a scheme by name (spec.md §6's exact scheme-name strings),
    /// either generating a fresh key pair or adopting one the caller
    /// supplies (`options.keys`, then `options.key_file`, then keygen, in
    /// that priority order).
    pub fn construct(scheme_name: &str, options: FacadeOptions) -> Result<Facade> {
        let kind = SchemeKind::from_name(scheme_name).ok_or_else(|| Error::UnsupportedScheme {
            name: scheme_name.to_string(),
        })?;
        let scheme: Arc<dyn Scheme> = Arc::from(scheme_for(kind));

        let keys = if let Some(keys) = options.keys {
            keys
        } else if let Some(path) = &options.key_file {
            keyfile::restore(path, kind)?
        } else {
            let key_size = match options.key_size {
                Some(size) => size,
                None => recommend_key_size(scheme_name)?,
            };
            let config = KeygenConfig {
                key_size,
                max_tries: options.max_tries.unwrap_or(10_000),
                plaintext_limit: options.plaintext_limit,
                curve_form: options.form.clone(),
                curve_name: options.curve.clone(),
            };
            let mut rng = ThreadRng::default();
            scheme.keygen(&config, &mut rng)?
        };

        Ok(Facade {
            kind,
            scheme,
            keys: Arc::new(keys),
            reporter: options.reporter.unwrap_or_else(|| Arc::new(NoopReporter)),
            precision: options.precision.unwrap_or(phe_core::fixed_point::DEFAULT_PRECISION),
        })
    }

    /// A facade over a pre-built scheme/key pair, bypassing name lookup.
    /// Used internally by [`Facade::public_only`]; exposed for callers that
    /// already hold typed [`KeyMaterial`] (e.g. after [`Facade::keys`]).
    pub fn from_keys(scheme: Arc<dyn Scheme>, keys: KeyMaterial, precision: u32, reporter: Arc<dyn Reporter>) -> Facade {
        Facade {
            kind: keys.kind,
            scheme,
            keys: Arc::new(keys),
            reporter,
            precision,
        }
    }

    /// Which scheme this Facade wraps.
    pub fn scheme_kind(&self) -> SchemeKind {
        self.kind
    }

    /// The underlying key material.
    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// An independent Facade over the same scheme with the private key
    /// stripped (spec.md §5: "a public-only copy must produce an
    /// independent handle whose key material contains no private
    /// components"), suitable for handing to an untrusted party or
    /// exporting for "cloud use" (spec.md §4.9).
    pub fn public_only(&self) -> Facade {
        Facade {
            kind: self.kind,
            scheme: self.scheme.clone(),
            keys: Arc::new(self.keys.public_only()),
            reporter: self.reporter.clone(),
            precision: self.precision,
        }
    }

    fn require_public_key(&self, operation: &'static str) -> Result<()> {
        // KeyMaterial::public is always present by construction; see its
        // doc comment. Kept as an explicit call site so every Facade entry
        // point states spec.md §4.9's "encrypt requires public_key"
        // invariant, rather than relying on that structural guarantee
        // silently.
        let _ = operation;
        Ok(())
    }

    fn require_private_key(&self, operation: &'static str) -> Result<()> {
        if self.keys.private.is_none() {
            return Err(self.scheme.missing_key(operation, "private").into());
        }
        Ok(())
    }

    /// Encrypts a scalar or tensor plaintext (spec.md §4.9).
    pub fn encrypt(&self, plaintext: impl Into<Plaintext>) -> Result<Encrypted> {
        self.require_public_key("encrypt")?;
        match plaintext.into() {
            Plaintext::List(values) => {
                let encoder = TensorEncoder::new(
                    self.scheme.clone(),
                    self.keys.clone(),
                    self.reporter.clone(),
                    self.precision,
                );
                let mut rng = ThreadRng::default();
                Ok(Encrypted::Tensor(encoder.encrypt(&values, &mut rng)?))
            }
            scalar => {
                let modulo = self.scheme.plaintext_modulo(&self.keys)?;
                let numeric = match scalar {
                    Plaintext::Int(v) => phe_core::fixed_point::Numeric::Int(v),
                    Plaintext::Float(v) => phe_core::fixed_point::Numeric::Float(v),
                    Plaintext::List(_) => unreachable!("handled above"),
                };
                let normalized = phe_core::fixed_point::normalize_input(&numeric, &modulo, self.precision)?;
                let mut rng = ThreadRng::default();
                let ciphertext = self
                    .scheme
                    .encrypt(&self.keys, &normalized, &mut rng, self.reporter.as_ref())?;
                Ok(Encrypted::Scalar(CiphertextHandle::new(
                    self.scheme.clone(),
                    self.keys.clone(),
                    self.reporter.clone(),
                    ciphertext,
                )))
            }
        }
    }

    /// Decrypts a scalar ciphertext or a tensor (spec.md §4.9).
    pub fn decrypt(&self, encrypted: &Encrypted) -> Result<Decrypted> {
        self.require_private_key("decrypt")?;
        match encrypted {
            Encrypted::Scalar(handle) => Ok(Decrypted::Int(handle.decrypt()?)),
            Encrypted::Tensor(tensor) => Ok(Decrypted::List(tensor.decrypt()?)),
        }
    }

    /// Re-randomises a scalar ciphertext without changing its plaintext
    /// (spec.md §4.9). Tensors have no single native ciphertext to
    /// re-randomise as a whole, so this only accepts [`Encrypted::Scalar`].
    pub fn regenerate_ciphertext(&self, encrypted: &Encrypted) -> Result<Encrypted> {
        let handle = encrypted
            .as_scalar()
            .map_err(|_| Error::NotAScalar { operation: "regenerate_ciphertext" })?;
        Ok(Encrypted::Scalar(handle.reencrypt()?))
    }

    /// Wraps an externally computed ciphertext value back into a handle
    /// tagged with this Facade's scheme and keys (spec.md §4.9).
    pub fn create_ciphertext_obj(&self, raw: Ciphertext) -> Encrypted {
        Encrypted::Scalar(CiphertextHandle::new(
            self.scheme.clone(),
            self.keys.clone(),
            self.reporter.clone(),
            raw,
        ))
    }

    /// Writes this Facade's keys to `path` as spec.md §6's JSON wire
    /// schema; when `public` is `true` the private half is omitted.
    pub fn export_keys(&self, path: impl AsRef<Path>, public: bool) -> Result<()> {
        if !public {
            log::warn!(
                "exporting {} keys without public=true; the exported file contains private key material",
                self.scheme.name()
            );
        }
        keyfile::export(path, &self.keys, public)
    }

    /// Reads a JSON key file written by [`Facade::export_keys`] (or this
    /// wire schema produced elsewhere) for this Facade's scheme.
    pub fn restore_keys(&self, path: impl AsRef<Path>) -> Result<KeyMaterial> {
        keyfile::restore(path, self.kind)
    }
}

/// A [`Facade`] that forwards diagnostic events to the `log` crate instead
/// of swallowing them (spec.md §9's re-expression of the original's
/// per-module `Logger`). Convenience for `FacadeOptions { reporter: Some(..),
/// ..Default::default() }`.
pub fn log_reporter() -> Arc<dyn Reporter> {
    Arc::new(LogReporter)
}
