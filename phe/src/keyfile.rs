//! JSON key export/import (spec.md §6, §9's "strict JSON instead of
//! `eval`"). `original_source`'s `restore_keys` loads a key file with
//! Python's `eval()` on the file's raw text; spec.md marks that a security
//! hazard that MUST NOT be reproduced, so this module only ever goes
//! through [`serde_json`]'s parser.
//!
//! Big integers are serialised as decimal strings rather than JSON
//! numbers — spec.md §6's "one permitted deviation" for languages without
//! arbitrary-precision JSON numbers, which Rust is one of.

use std::path::Path;

use num_bigint::{BigInt, BigUint};
use phe_core::curve::catalogue;
use phe_schemes::{KeyMaterial, PrivateKey, PublicKey, SchemeKind};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

fn big(v: &BigUint) -> Value {
    Value::String(v.to_str_radix(10))
}

fn sbig(v: &BigInt) -> Value {
    Value::String(v.to_str_radix(10))
}

fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::MalformedKeyFile(format!("missing or non-string field {key:?}")))
}

fn parse_biguint(obj: &Map<String, Value>, key: &str) -> Result<BigUint> {
    let s = field(obj, key)?;
    s.parse()
        .map_err(|_| Error::MalformedKeyFile(format!("field {key:?} is not a decimal integer: {s:?}")))
}

fn parse_bigint(obj: &Map<String, Value>, key: &str) -> Result<BigInt> {
    let s = field(obj, key)?;
    s.parse()
        .map_err(|_| Error::MalformedKeyFile(format!("field {key:?} is not a decimal integer: {s:?}")))
}

fn parse_u32(obj: &Map<String, Value>, key: &str) -> Result<u32> {
    obj.get(key)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::MalformedKeyFile(format!("missing or non-numeric field {key:?}")))
}

fn as_object<'a>(v: &'a Value, which: &'static str) -> Result<&'a Map<String, Value>> {
    v.as_object()
        .ok_or_else(|| Error::MalformedKeyFile(format!("{which} must be a JSON object")))
}

/// `public_key` half of the wire schema (spec.md §6).
fn public_to_json(public: &PublicKey) -> Value {
    let mut obj = Map::new();
    match public {
        PublicKey::Rsa { n, e } => {
            obj.insert("n".into(), big(n));
            obj.insert("e".into(), big(e));
        }
        PublicKey::ElGamal { p, g, y } => {
            obj.insert("p".into(), big(p));
            obj.insert("g".into(), big(g));
            obj.insert("y".into(), big(y));
        }
        PublicKey::Paillier { n, g } => {
            obj.insert("n".into(), big(n));
            obj.insert("g".into(), big(g));
        }
        PublicKey::DamgardJurik { n, g, s } => {
            obj.insert("n".into(), big(n));
            obj.insert("g".into(), big(g));
            obj.insert("s".into(), Value::from(*s));
        }
        PublicKey::OkamotoUchiyama { n, g, h } => {
            obj.insert("n".into(), big(n));
            obj.insert("g".into(), big(g));
            obj.insert("h".into(), big(h));
        }
        PublicKey::Benaloh { n, y, r } => {
            obj.insert("n".into(), big(n));
            obj.insert("y".into(), big(y));
            obj.insert("r".into(), big(r));
        }
        PublicKey::NaccacheStern { n, g, sigma } => {
            obj.insert("n".into(), big(n));
            obj.insert("g".into(), big(g));
            obj.insert("sigma".into(), big(sigma));
        }
        PublicKey::GoldwasserMicali { n, x } => {
            obj.insert("n".into(), big(n));
            obj.insert("x".into(), big(x));
        }
        PublicKey::EcElGamal { curve, qa } => {
            obj.insert("form".into(), Value::String(curve.form.name().to_string()));
            obj.insert("curve".into(), Value::String(curve.name.to_string()));
            let qa_obj = match qa {
                Some(p) => {
                    let mut m = Map::new();
                    m.insert("x".into(), big(&p.x));
                    m.insert("y".into(), big(&p.y));
                    Value::Object(m)
                }
                None => Value::Null,
            };
            obj.insert("Qa".into(), qa_obj);
        }
    }
    Value::Object(obj)
}

/// `private_key` half of the wire schema (spec.md §6).
fn private_to_json(private: &PrivateKey) -> Value {
    let mut obj = Map::new();
    match private {
        PrivateKey::Rsa { d } => {
            obj.insert("d".into(), big(d));
        }
        PrivateKey::ElGamal { x } => {
            obj.insert("x".into(), big(x));
        }
        PrivateKey::Paillier { phi } => {
            obj.insert("phi".into(), big(phi));
        }
        PrivateKey::DamgardJurik { phi } => {
            obj.insert("phi".into(), big(phi));
        }
        PrivateKey::OkamotoUchiyama { p, q } => {
            obj.insert("p".into(), big(p));
            obj.insert("q".into(), big(q));
        }
        PrivateKey::Benaloh { p, q, phi, x } => {
            obj.insert("p".into(), big(p));
            obj.insert("q".into(), big(q));
            obj.insert("phi".into(), big(phi));
            obj.insert("x".into(), big(x));
        }
        PrivateKey::NaccacheStern { p, q, phi, prime_set } => {
            obj.insert("p".into(), big(p));
            obj.insert("q".into(), big(q));
            obj.insert("phi".into(), big(phi));
            obj.insert(
                "prime_set".into(),
                Value::Array(prime_set.iter().map(big).collect()),
            );
        }
        PrivateKey::GoldwasserMicali { p, q } => {
            obj.insert("p".into(), big(p));
            obj.insert("q".into(), big(q));
        }
        PrivateKey::EcElGamal { ka } => {
            obj.insert("ka".into(), sbig(ka));
        }
    }
    Value::Object(obj)
}

/// Serialises `key` to spec.md §6's wire schema: `{"public_key": {...}}`
/// plus `"private_key"` unless `public_only` is set (the Facade's
/// `export_keys(path, public=true)`, and the general rule that a
/// "public-only copy must produce an independent handle whose key material
/// contains no private components", spec.md §5).
pub fn to_json(key: &KeyMaterial, public_only: bool) -> Value {
    let mut top = Map::new();
    top.insert("public_key".into(), public_to_json(&key.public));
    if !public_only {
        if let Some(private) = &key.private {
            top.insert("private_key".into(), private_to_json(private));
        }
    }
    Value::Object(top)
}

fn public_from_json(kind: SchemeKind, obj: &Map<String, Value>) -> Result<PublicKey> {
    Ok(match kind {
        SchemeKind::Rsa => PublicKey::Rsa {
            n: parse_biguint(obj, "n")?,
            e: parse_biguint(obj, "e")?,
        },
        SchemeKind::ElGamal | SchemeKind::ExponentialElGamal => PublicKey::ElGamal {
            p: parse_biguint(obj, "p")?,
            g: parse_biguint(obj, "g")?,
            y: parse_biguint(obj, "y")?,
        },
        SchemeKind::Paillier => PublicKey::Paillier {
            n: parse_biguint(obj, "n")?,
            g: parse_biguint(obj, "g")?,
        },
        SchemeKind::DamgardJurik => PublicKey::DamgardJurik {
            n: parse_biguint(obj, "n")?,
            g: parse_biguint(obj, "g")?,
            s: parse_u32(obj, "s")?,
        },
        SchemeKind::OkamotoUchiyama => PublicKey::OkamotoUchiyama {
            n: parse_biguint(obj, "n")?,
            g: parse_biguint(obj, "g")?,
            h: parse_biguint(obj, "h")?,
        },
        SchemeKind::Benaloh => PublicKey::Benaloh {
            n: parse_biguint(obj, "n")?,
            y: parse_biguint(obj, "y")?,
            r: parse_biguint(obj, "r")?,
        },
        SchemeKind::NaccacheStern => PublicKey::NaccacheStern {
            n: parse_biguint(obj, "n")?,
            g: parse_biguint(obj, "g")?,
            sigma: parse_biguint(obj, "sigma")?,
        },
        SchemeKind::GoldwasserMicali => PublicKey::GoldwasserMicali {
            n: parse_biguint(obj, "n")?,
            x: parse_biguint(obj, "x")?,
        },
        SchemeKind::EcElGamal => {
            let form = field(obj, "form")?;
            let name = field(obj, "curve")?;
            let curve = catalogue::lookup(form, Some(name))?;
            let qa = match obj.get("Qa") {
                Some(Value::Object(point)) => Some(phe_core::curve::AffinePoint::new(
                    parse_biguint(point, "x")?,
                    parse_biguint(point, "y")?,
                )),
                _ => None,
            };
            PublicKey::EcElGamal { curve, qa }
        }
    })
}

fn private_from_json(kind: SchemeKind, obj: &Map<String, Value>) -> Result<PrivateKey> {
    Ok(match kind {
        SchemeKind::Rsa => PrivateKey::Rsa { d: parse_biguint(obj, "d")? },
        SchemeKind::ElGamal | SchemeKind::ExponentialElGamal => {
            PrivateKey::ElGamal { x: parse_biguint(obj, "x")? }
        }
        SchemeKind::Paillier => PrivateKey::Paillier { phi: parse_biguint(obj, "phi")? },
        SchemeKind::DamgardJurik => PrivateKey::DamgardJurik { phi: parse_biguint(obj, "phi")? },
        SchemeKind::OkamotoUchiyama => PrivateKey::OkamotoUchiyama {
            p: parse_biguint(obj, "p")?,
            q: parse_biguint(obj, "q")?,
        },
        SchemeKind::Benaloh => PrivateKey::Benaloh {
            p: parse_biguint(obj, "p")?,
            q: parse_biguint(obj, "q")?,
            phi: parse_biguint(obj, "phi")?,
            x: parse_biguint(obj, "x")?,
        },
        SchemeKind::NaccacheStern => {
            let prime_set = obj
                .get("prime_set")
                .and_then(Value::as_array)
                .ok_or_else(|| Error::MalformedKeyFile("missing field \"prime_set\"".to_string()))?
                .iter()
                .map(|v| {
                    v.as_str()
                        .and_then(|s| s.parse::<BigUint>().ok())
                        .ok_or_else(|| Error::MalformedKeyFile("prime_set entry is not a decimal integer".to_string()))
                })
                .collect::<Result<Vec<_>>>()?;
            PrivateKey::NaccacheStern {
                p: parse_biguint(obj, "p")?,
                q: parse_biguint(obj, "q")?,
                phi: parse_biguint(obj, "phi")?,
                prime_set,
            }
        }
        SchemeKind::GoldwasserMicali => PrivateKey::GoldwasserMicali {
            p: parse_biguint(obj, "p")?,
            q: parse_biguint(obj, "q")?,
        },
        SchemeKind::EcElGamal => PrivateKey::EcElGamal { ka: parse_bigint(obj, "ka")? },
    })
}

/// Parses spec.md §6's wire schema back into a [`KeyMaterial`] tagged
/// `kind` (the Facade already knows which scheme it was constructed for,
/// so — matching `original_source`'s `restore_keys`, which is always
/// called from inside an already-named `LightPHE` instance — the scheme
/// name itself does not need to round-trip through the JSON).
pub fn from_json(kind: SchemeKind, value: &Value) -> Result<KeyMaterial> {
    let top = as_object(value, "key file")?;
    let public_obj = top
        .get("public_key")
        .ok_or_else(|| Error::MalformedKeyFile("missing top-level \"public_key\"".to_string()))?;
    let public = public_from_json(kind, as_object(public_obj, "public_key")?)?;

    let private = match top.get("private_key") {
        Some(private_obj) => Some(private_from_json(kind, as_object(private_obj, "private_key")?)?),
        None => None,
    };

    Ok(KeyMaterial { kind, public, private })
}

/// Writes `key` to `path` as spec.md §6's JSON wire schema.
pub fn export(path: impl AsRef<Path>, key: &KeyMaterial, public_only: bool) -> Result<()> {
    let value = to_json(key, public_only);
    let text = serde_json::to_string_pretty(&value).expect("Value serialisation cannot fail");
    std::fs::write(path, text)?;
    Ok(())
}

/// Reads a key file written by [`export`] (or another implementation of
/// this wire schema) back into a [`KeyMaterial`] for scheme `kind`.
pub fn restore(path: impl AsRef<Path>, kind: SchemeKind) -> Result<KeyMaterial> {
    let text = std::fs::read_to_string(path)?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| Error::MalformedKeyFile(e.to_string()))?;
    from_json(kind, &value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phe_schemes::{KeygenConfig, Paillier, Scheme};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn roundtrips_through_json() {
        let scheme = Paillier;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        let key = scheme.keygen(&config, &mut rng).unwrap();

        let json = to_json(&key, false);
        let restored = from_json(SchemeKind::Paillier, &json).unwrap();
        assert_eq!(restored.private.is_some(), key.private.is_some());

        let public_json = to_json(&key, true);
        let public_only = from_json(SchemeKind::Paillier, &public_json).unwrap();
        assert!(public_only.private.is_none());
    }

    #[test]
    fn export_then_restore_round_trip_on_disk() {
        let scheme = Paillier;
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let config = KeygenConfig {
            key_size: 64,
            ..KeygenConfig::default()
        };
        let key = scheme.keygen(&config, &mut rng).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        export(&path, &key, false).unwrap();
        let restored = restore(&path, SchemeKind::Paillier).unwrap();
        assert_eq!(restored.private.is_some(), true);

        let public_path = dir.path().join("public.json");
        export(&public_path, &key, true).unwrap();
        let restored_public = restore(&public_path, SchemeKind::Paillier).unwrap();
        assert!(restored_public.private.is_none());
    }
}
