//! Facade-layer errors: wraps every lower layer's [`thiserror::Error`] and
//! adds the tags that only make sense once a scheme name is a plain string
//! instead of a typed [`phe_schemes::SchemeKind`] (spec.md §7).

use thiserror::Error;

/// Errors raised by [`crate::Facade`].
#[derive(Debug, Error)]
pub enum Error {
    /// Propagated from a scheme operation.
    #[error(transparent)]
    Scheme(#[from] phe_schemes::Error),

    /// Propagated from a tensor operation.
    #[error(transparent)]
    Tensor(#[from] phe_tensor::Error),

    /// Propagated from the arithmetic core.
    #[error(transparent)]
    Core(#[from] phe_core::Error),

    /// `construct` or `recommend_key_size` was given a name outside spec.md
    /// §6's closed list of nine scheme names.
    #[error("unsupported scheme {name:?}; expected one of RSA, ElGamal, Exponential-ElGamal, EllipticCurve-ElGamal, Paillier, Damgard-Jurik, Okamoto-Uchiyama, Benaloh, Naccache-Stern, Goldwasser-Micali")]
    UnsupportedScheme {
        /// The name that was supplied.
        name: String,
    },

    /// A key file could not be read or written.
    #[error("key file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A key file's JSON did not match the wire schema spec.md §6 defines
    /// (missing a required field, wrong shape, or a non-decimal string
    /// where a big integer was expected).
    #[error("malformed key file: {0}")]
    MalformedKeyFile(String),

    /// `regenerate_ciphertext` (or any other scalar-only operation) was
    /// called on an [`crate::Encrypted::Tensor`], which has no single
    /// native ciphertext to re-randomise.
    #[error("{operation} is only defined on a scalar ciphertext, not a tensor")]
    NotAScalar {
        /// The operation that was attempted.
        operation: &'static str,
    },
}

/// Result type for the Facade layer.
pub type Result<T> = core::result::Result<T, Error>;
