//! [`KeyMaterial`] (spec.md §3) and the scheme-name enum used to select a
//! [`crate::Scheme`] implementation at runtime (spec.md §6).

use num_bigint::{BigInt, BigUint};
use phe_core::curve::{Curve, Point};

/// The nine scheme names, spelled exactly as spec.md §6 requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// `"RSA"`
    Rsa,
    /// `"ElGamal"`
    ElGamal,
    /// `"Exponential-ElGamal"`
    ExponentialElGamal,
    /// `"EllipticCurve-ElGamal"`
    EcElGamal,
    /// `"Paillier"`
    Paillier,
    /// `"Damgard-Jurik"`
    DamgardJurik,
    /// `"Okamoto-Uchiyama"`
    OkamotoUchiyama,
    /// `"Benaloh"`
    Benaloh,
    /// `"Naccache-Stern"`
    NaccacheStern,
    /// `"Goldwasser-Micali"`
    GoldwasserMicali,
}

impl SchemeKind {
    /// The canonical wire/API name.
    pub fn name(&self) -> &'static str {
        match self {
            SchemeKind::Rsa => "RSA",
            SchemeKind::ElGamal => "ElGamal",
            SchemeKind::ExponentialElGamal => "Exponential-ElGamal",
            SchemeKind::EcElGamal => "EllipticCurve-ElGamal",
            SchemeKind::Paillier => "Paillier",
            SchemeKind::DamgardJurik => "Damgard-Jurik",
            SchemeKind::OkamotoUchiyama => "Okamoto-Uchiyama",
            SchemeKind::Benaloh => "Benaloh",
            SchemeKind::NaccacheStern => "Naccache-Stern",
            SchemeKind::GoldwasserMicali => "Goldwasser-Micali",
        }
    }

    /// Parses a scheme name, returning `None` for anything unrecognised
    /// (the Facade turns that into `Error::UnsupportedScheme`).
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "RSA" => SchemeKind::Rsa,
            "ElGamal" => SchemeKind::ElGamal,
            "Exponential-ElGamal" => SchemeKind::ExponentialElGamal,
            "EllipticCurve-ElGamal" => SchemeKind::EcElGamal,
            "Paillier" => SchemeKind::Paillier,
            "Damgard-Jurik" => SchemeKind::DamgardJurik,
            "Okamoto-Uchiyama" => SchemeKind::OkamotoUchiyama,
            "Benaloh" => SchemeKind::Benaloh,
            "Naccache-Stern" => SchemeKind::NaccacheStern,
            "Goldwasser-Micali" => SchemeKind::GoldwasserMicali,
            _ => return None,
        })
    }
}

/// Public half of a [`KeyMaterial`], shaped per scheme (spec.md §3).
#[derive(Debug, Clone)]
pub enum PublicKey {
    /// RSA: `{n, e}`.
    Rsa { n: BigUint, e: BigUint },
    /// ElGamal / Exponential ElGamal: `{p, g, y}` with `y = g^x mod p`.
    ElGamal { p: BigUint, g: BigUint, y: BigUint },
    /// Paillier: `{n, g}`.
    Paillier { n: BigUint, g: BigUint },
    /// Damgård-Jurik: `{n, g, s}`.
    DamgardJurik { n: BigUint, g: BigUint, s: u32 },
    /// Okamoto-Uchiyama: `{n, g, h}`, `n = p²q`.
    OkamotoUchiyama { n: BigUint, g: BigUint, h: BigUint },
    /// Benaloh: `{n, y, r}`.
    Benaloh { n: BigUint, y: BigUint, r: BigUint },
    /// Naccache-Stern: `{n, g, sigma}`.
    NaccacheStern { n: BigUint, g: BigUint, sigma: BigUint },
    /// Goldwasser-Micali: `{n, x}`, `x` a quadratic non-residue with
    /// Jacobi symbol `-1` modulo both prime factors of `n`.
    GoldwasserMicali { n: BigUint, x: BigUint },
    /// EC-ElGamal: curve identity plus `Qa = ka * G`.
    EcElGamal { curve: Curve, qa: Point },
}

/// Private half of a [`KeyMaterial`] (spec.md §3).
#[derive(Debug, Clone)]
pub enum PrivateKey {
    /// RSA: `{d}`.
    Rsa { d: BigUint },
    /// ElGamal / Exponential ElGamal: `{x}`.
    ElGamal { x: BigUint },
    /// Paillier: `{phi}`.
    Paillier { phi: BigUint },
    /// Damgård-Jurik: `{phi}` (the same `s` lives on the public key).
    DamgardJurik { phi: BigUint },
    /// Okamoto-Uchiyama: `{p, q}`.
    OkamotoUchiyama { p: BigUint, q: BigUint },
    /// Benaloh: `{p, q, phi, x}`.
    Benaloh {
        p: BigUint,
        q: BigUint,
        phi: BigUint,
        x: BigUint,
    },
    /// Naccache-Stern: `{p, q, phi, prime_set}`.
    NaccacheStern {
        p: BigUint,
        q: BigUint,
        phi: BigUint,
        prime_set: Vec<BigUint>,
    },
    /// Goldwasser-Micali: `{p, q}`.
    GoldwasserMicali { p: BigUint, q: BigUint },
    /// EC-ElGamal: `{ka}`.
    EcElGamal { ka: BigInt },
}

/// A keyed record with an always-present public half and an optional
/// private half (spec.md §3's `KeyMaterial`).
///
/// Invariant: any operation requiring the private key fails with
/// `Error::MissingKey` if `private` is `None`; encryption requires
/// `public` to exist, which is why this type has no "no keys at all" state
/// — a `KeyMaterial` is only ever constructed alongside at least a public
/// key.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// Which scheme this key material belongs to.
    pub kind: SchemeKind,
    /// Always present.
    pub public: PublicKey,
    /// Present after a full keygen; absent on a "public-only" copy made for
    /// export or for handing to an untrusted party (spec.md §5).
    pub private: Option<PrivateKey>,
}

impl KeyMaterial {
    /// An independent copy with the private key stripped — spec.md §5's
    /// "creating a public-only copy must produce an independent handle
    /// whose key material contains no private components".
    pub fn public_only(&self) -> KeyMaterial {
        KeyMaterial {
            kind: self.kind,
            public: self.public.clone(),
            private: None,
        }
    }
}

/// Tuning knobs for the probabilistic keygen loops (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct KeygenConfig {
    /// Key size in bits (meaning is scheme-specific: RSA/Paillier use it as
    /// the modulus size, Benaloh/Naccache-Stern as a prime's size).
    pub key_size: u32,
    /// Upper bound on keygen retries before `Error::KeyGenFailure`.
    pub max_tries: u32,
    /// Optional override for schemes whose plaintext group is capped by a
    /// caller-chosen limit (Benaloh's `r`, Naccache-Stern's `sigma`) rather
    /// than derived purely from `key_size`.
    pub plaintext_limit: Option<BigUint>,
    /// Curve form, for EC-ElGamal only (`None` elsewhere).
    pub curve_form: Option<String>,
    /// Curve name, for EC-ElGamal only (`None` selects the form's default).
    pub curve_name: Option<String>,
}

impl Default for KeygenConfig {
    fn default() -> Self {
        KeygenConfig {
            key_size: 1024,
            max_tries: 10_000,
            plaintext_limit: None,
            curve_form: None,
            curve_name: None,
        }
    }
}
