//! Arbitrary-precision modular arithmetic, GF(2) polynomial arithmetic, and
//! an elliptic-curve arithmetic engine over a static curve catalogue.
//!
//! This crate is THE hard core of the lightphe-rs workspace (spec.md §1):
//! every operation here is a pure function of its inputs and the relevant
//! curve/scheme parameters, with no suspension points and no shared mutable
//! state (spec.md §5). Randomness is always a parameter (`impl RngCore`),
//! never a global.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod bigint;
pub mod binary_field;
pub mod curve;
pub mod error;
pub mod fixed_point;
pub mod reporter;

pub use error::{Error, Result};
pub use reporter::{Event, LogReporter, NoopReporter, Reporter};
