//! The nine partially homomorphic cryptosystems (spec.md §4.6) behind a
//! single [`Scheme`] capability trait, plus [`CiphertextHandle`] (spec.md
//! §4.7) and the [`KeyMaterial`]/[`SchemeKind`] types (spec.md §3, §6) that
//! tie a scheme implementation to its keys.
//!
//! This crate has no opinion on *which* scheme a caller wants — that
//! selection-by-name lives one layer up, in `phe`'s Facade. What lives here
//! is every scheme's actual arithmetic, expressed against `phe-core`'s
//! `BigModArith` and `CurveEngine`.

#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod ciphertext;
pub mod error;
pub mod keys;
pub mod scheme;
pub mod schemes;

pub use ciphertext::{noop_reporter, Ciphertext, CiphertextHandle};
pub use error::{Error, Result};
pub use keys::{KeyMaterial, KeygenConfig, PrivateKey, PublicKey, SchemeKind};
pub use scheme::Scheme;
pub use schemes::{
    benaloh::Benaloh, damgard_jurik::DamgardJurik, ec_elgamal::EcElGamal, elgamal::ElGamal,
    goldwasser_micali::GoldwasserMicali, naccache_stern::NaccacheStern,
    okamoto_uchiyama::OkamotoUchiyama, paillier::Paillier, rsa::Rsa,
};

/// Constructs the [`Scheme`] implementation for a [`SchemeKind`]. The
/// Facade uses this to go from spec.md §6's scheme-name strings (already
/// parsed into a `SchemeKind` by [`SchemeKind::from_name`]) to a concrete,
/// boxed trait object.
pub fn scheme_for(kind: SchemeKind) -> Box<dyn Scheme> {
    match kind {
        SchemeKind::Rsa => Box::new(Rsa),
        SchemeKind::ElGamal => Box::new(ElGamal::multiplicative()),
        SchemeKind::ExponentialElGamal => Box::new(ElGamal::exponential()),
        SchemeKind::EcElGamal => Box::new(EcElGamal),
        SchemeKind::Paillier => Box::new(Paillier),
        SchemeKind::DamgardJurik => Box::new(DamgardJurik::default()),
        SchemeKind::OkamotoUchiyama => Box::new(OkamotoUchiyama),
        SchemeKind::Benaloh => Box::new(Benaloh),
        SchemeKind::NaccacheStern => Box::new(NaccacheStern),
        SchemeKind::GoldwasserMicali => Box::new(GoldwasserMicali),
    }
}
