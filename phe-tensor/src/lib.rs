//! Fixed-point tensor encoding over a PHE scheme (spec.md §3, §4.8).
//!
//! A [`Numeric`] sequence is encrypted into an [`EncryptedTensor`] via
//! [`TensorEncoder`], one [`Fraction`] per element. Element-wise `+`, `*`,
//! scalar multiplication, multiplication with a plain list and dot product
//! are implemented directly on [`EncryptedTensor`] in terms of the
//! underlying [`phe_schemes::CiphertextHandle`] operators.

pub mod encoder;
pub mod error;
pub mod fraction;
pub mod tensor;

pub use encoder::TensorEncoder;
pub use error::{Error, Result};
pub use fraction::Fraction;
pub use phe_core::fixed_point::Numeric;
pub use tensor::EncryptedTensor;
