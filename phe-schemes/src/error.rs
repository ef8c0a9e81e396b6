//! Scheme-layer errors: wraps [`phe_core::Error`] and adds the tags that
//! only make sense once a scheme is in the picture (spec.md §7).

use thiserror::Error;

/// Errors raised by [`crate::Scheme`] implementations and [`crate::CiphertextHandle`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Propagated from the arithmetic core (`phe-core`).
    #[error(transparent)]
    Core(#[from] phe_core::Error),

    /// The requested homomorphic operation (or re-encryption) is outside
    /// this scheme's capability set.
    #[error("{scheme} does not support {operation}")]
    UnsupportedOperation {
        /// Scheme name, e.g. `"Benaloh"`.
        scheme: &'static str,
        /// Operation name, e.g. `"multiply"`.
        operation: &'static str,
    },

    /// An operation needed the public key, the private key, or both, and it
    /// wasn't present in the supplied [`crate::KeyMaterial`].
    #[error("{scheme} operation {operation} requires a {which} key, which is absent")]
    MissingKey {
        /// Scheme name.
        scheme: &'static str,
        /// Operation name.
        operation: &'static str,
        /// Which key was missing.
        which: &'static str,
    },

    /// A probabilistic keygen loop exhausted `max_tries` without producing a
    /// valid key set.
    #[error("{scheme} key generation failed after {tries} tries")]
    KeyGenFailure {
        /// Scheme name.
        scheme: &'static str,
        /// Number of attempts made.
        tries: u32,
    },

    /// A discrete-log-based decryption (Benaloh / Exponential-ElGamal /
    /// EC-ElGamal / Naccache-Stern) could not recover a plaintext within its
    /// search bound — scheme misuse, not a bug: the plaintext was too large
    /// for the configured search space.
    #[error("{scheme} could not recover a plaintext within the search bound {bound}")]
    DecryptionFailure {
        /// Scheme name.
        scheme: &'static str,
        /// The search bound that was exhausted.
        bound: String,
    },
}

/// Result type for the scheme layer.
pub type Result<T> = core::result::Result<T, Error>;
