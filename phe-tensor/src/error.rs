//! Errors raised by tensor-level operations, layered over [`phe_schemes::Error`].

use thiserror::Error;

/// Errors raised by [`crate::EncryptedTensor`] and [`crate::TensorEncoder`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Propagated from a per-element scheme operation (encrypt/decrypt/add/
    /// multiply/scalar-multiply).
    #[error(transparent)]
    Scheme(#[from] phe_schemes::Error),

    /// Propagated from fixed-point encoding (e.g. a negative float).
    #[error(transparent)]
    Core(#[from] phe_core::Error),

    /// Two tensors (or a tensor and a plain list) were combined element-wise
    /// but did not have the same length.
    #[error("tensor length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the left-hand operand.
        expected: usize,
        /// Length of the right-hand operand.
        actual: usize,
    },

    /// Element-wise multiplication with a plaintext list requires every
    /// element of both operands to be non-negative (spec's documented
    /// limitation: signs cannot be disentangled from a modular product).
    #[error("element-wise multiplication with a plain list requires every operand to be non-negative")]
    NegativeOperand,

    /// A dot product or element-wise op was attempted against an empty tensor.
    #[error("tensor must contain at least one element")]
    EmptyTensor,
}

/// Result type for the tensor layer.
pub type Result<T> = core::result::Result<T, Error>;
