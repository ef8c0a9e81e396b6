//! Partially homomorphic encryption, behind one [`Facade`] (spec.md §1,
//! §4.9): construct a scheme by name, encrypt/decrypt scalars or tensors,
//! homomorphically combine ciphertexts, and persist keys as JSON.
//!
//! ```no_run
//! use phe::{Facade, FacadeOptions};
//!
//! let facade = Facade::construct("Paillier", FacadeOptions {
//!     key_size: Some(64),
//!     ..Default::default()
//! })?;
//! let a = facade.encrypt(4i64)?;
//! let b = facade.encrypt(6i64)?;
//! let sum = a.as_scalar()?.add(b.as_scalar()?)?;
//! assert_eq!(facade.decrypt(&phe::Encrypted::Scalar(sum))?, phe::Decrypted::Int(10u8.into()));
//! # Ok::<(), phe::Error>(())
//! ```

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod error;
mod facade;
pub mod keyfile;

pub use error::{Error, Result};
pub use facade::{log_reporter, recommend_key_size, Decrypted, Encrypted, Facade, FacadeOptions, Plaintext};
pub use phe_schemes::{Ciphertext, CiphertextHandle, KeyMaterial, PrivateKey, PublicKey, SchemeKind};
pub use phe_tensor::{EncryptedTensor, Numeric};
