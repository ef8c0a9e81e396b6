//! Error taxonomy shared by every layer of the workspace.

use thiserror::Error;

/// Errors raised by the arithmetic core: [`crate::bigint`], [`crate::binary_field`],
/// [`crate::curve`] and [`crate::fixed_point`].
///
/// Higher layers (`phe-schemes`, `phe-tensor`, `phe`) wrap this type with
/// `#[from]` and add their own variants rather than duplicating these tags.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `mod_inv` was asked for the inverse of a value that shares a factor
    /// with the modulus.
    #[error("{value} has no modular inverse mod {modulus}: gcd is {gcd}")]
    NoModularInverse {
        /// The value whose inverse was requested, rendered for diagnostics.
        value: String,
        /// The modulus, rendered for diagnostics.
        modulus: String,
        /// The non-trivial gcd that proves no inverse exists.
        gcd: String,
    },

    /// `random_prime` exhausted its candidate budget without finding a prime
    /// in the requested bit range.
    #[error("no prime found with bit length in [{low}, {high}) after {tries} tries")]
    PrimeSearchExhausted {
        /// Lower bound (inclusive) of the requested bit range.
        low: u32,
        /// Upper bound (exclusive) of the requested bit range.
        high: u32,
        /// Number of candidates tried.
        tries: u32,
    },

    /// An unknown (form, name) pair was looked up in the curve catalogue, or
    /// a name was given for a form that doesn't define it.
    #[error("unsupported curve {name:?} for form {form}")]
    UnsupportedCurve {
        /// The curve form that was queried.
        form: &'static str,
        /// The curve name that was queried, if any (`None` selects the
        /// form's default, so this only appears when a name was given).
        name: Option<String>,
    },

    /// An unknown curve form name was supplied at a string boundary (e.g. the
    /// Facade's `form` constructor argument).
    #[error("unsupported curve form {0:?}")]
    UnsupportedForm(String),

    /// A produced point does not satisfy its curve's defining equation. This
    /// is an internal bug-catcher: spec.md marks it as "never raised on valid
    /// inputs", so seeing this means the arithmetic above it is wrong, not
    /// that the caller misused the API.
    #[error("point ({x}, {y}) is not on curve {curve}")]
    PointNotOnCurve {
        /// The curve the point was checked against.
        curve: &'static str,
        /// x-coordinate, rendered for diagnostics.
        x: String,
        /// y-coordinate, rendered for diagnostics.
        y: String,
    },

    /// `FixedPoint::normalize_input` was given a negative float, which the
    /// original `lightphe` package never implements either.
    #[error("negative floats are not supported by fixed-point normalization")]
    UnsupportedInput,
}

/// Result type for the arithmetic core.
pub type Result<T> = core::result::Result<T, Error>;
