//! [`Fraction`] (spec.md §3, §4.8): a single tensor element, held as three
//! ciphertext tracks plus a sign bit rather than a single encrypted number —
//! the absolute-value track survives re-signing under addition, while the
//! signed track keeps the mod-`p` representation decryption actually needs.

use phe_schemes::CiphertextHandle;

/// One element of an [`crate::EncryptedTensor`].
#[derive(Debug, Clone)]
pub struct Fraction {
    /// Encrypted signed numerator, reduced mod the scheme's plaintext group
    /// (so a negative value appears as its large positive residue).
    pub dividend: CiphertextHandle,
    /// Encrypted `|numerator|`, scaled the same way as `dividend`.
    pub abs_dividend: CiphertextHandle,
    /// Encrypted scaling factor, `10^precision`, shared across every
    /// element of the owning tensor.
    pub divisor: CiphertextHandle,
    /// `+1` or `-1`.
    pub sign: i8,
}
