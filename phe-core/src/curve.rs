//! Elliptic-curve arithmetic engine (spec.md §4.4, `CurveEngine`) over a
//! closed-enumeration registry of named curves (spec.md §4.3,
//! `CurveCatalogue`).
//!
//! The teacher workspace (RustCrypto/elliptic-curves) gives every curve its
//! own crate with a field backend generated for that curve's specific prime
//! at compile time (`k256`, `p256`, ...). That doesn't fit a registry that
//! has to answer "which curve" at *runtime* from a name string (spec.md
//! §6's `construct(..., form, curve)`), so this module re-expresses the same
//! capability set — add, double, negate, is-on-curve, scalar-multiply,
//! identity — as one generic implementation per form, parameterised by the
//! catalogue's data rather than by the Rust type system.

pub mod catalogue;
mod edwards;
mod koblitz;
mod weierstrass;

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, Zero};

use crate::error::{Error, Result};

/// An affine point `(x, y)`. Coordinates are always stored non-negative
/// (residues mod the field modulus, or GF(2^m) bit patterns for Koblitz).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffinePoint {
    /// x-coordinate.
    pub x: BigUint,
    /// y-coordinate.
    pub y: BigUint,
}

impl AffinePoint {
    /// Constructs a point from coordinates.
    pub fn new(x: BigUint, y: BigUint) -> Self {
        AffinePoint { x, y }
    }
}

/// A curve point: `Some` for an affine point, `None` for the identity
/// element (the point at infinity, for Weierstrass and Koblitz). Twisted
/// Edwards curves never use `None` — their identity `(0, 1)` is an ordinary
/// affine point.
pub type Point = Option<AffinePoint>;

/// Short Weierstrass curve parameters: `y² = x³ + ax + b (mod p)`.
#[derive(Debug, Clone)]
pub struct WeierstrassParams {
    /// Field prime.
    pub p: BigUint,
    /// Linear coefficient.
    pub a: BigInt,
    /// Constant coefficient.
    pub b: BigInt,
    /// Base point.
    pub g: AffinePoint,
    /// Order of the base point's subgroup.
    pub order: BigUint,
}

/// Twisted Edwards curve parameters: `a·x² + y² = 1 + d·x²y² (mod p)`.
#[derive(Debug, Clone)]
pub struct EdwardsParams {
    /// Field prime.
    pub p: BigUint,
    /// Quadratic coefficient.
    pub a: BigInt,
    /// Twist coefficient.
    pub d: BigInt,
    /// Base point.
    pub g: AffinePoint,
    /// Order of the base point's subgroup.
    pub order: BigUint,
}

/// Koblitz (binary anomalous) curve parameters over `GF(2^m)`:
/// `y² + xy = x³ + ax² + b`.
#[derive(Debug, Clone)]
pub struct KoblitzParams {
    /// Irreducible reduction polynomial (degree `m`), as a bit pattern.
    pub poly: BigUint,
    /// `a ∈ {0, 1}` for the two standard Koblitz curves per field.
    pub a: BigUint,
    /// Curve constant, always `1` for the standard NIST Koblitz curves.
    pub b: BigUint,
    /// Base point.
    pub g: AffinePoint,
    /// Order of the base point's subgroup.
    pub order: BigUint,
}

/// The three supported curve shapes (spec.md §2 item 4).
#[derive(Debug, Clone)]
pub enum CurveForm {
    /// Short Weierstrass form over a prime field.
    Weierstrass(WeierstrassParams),
    /// Twisted Edwards form over a prime field.
    Edwards(EdwardsParams),
    /// Koblitz form over a binary field.
    Koblitz(KoblitzParams),
}

impl CurveForm {
    /// The string spec.md §6 uses for this form at API boundaries.
    pub fn name(&self) -> &'static str {
        match self {
            CurveForm::Weierstrass(_) => "weierstrass",
            CurveForm::Edwards(_) => "edwards",
            CurveForm::Koblitz(_) => "koblitz",
        }
    }

    fn order(&self) -> &BigUint {
        match self {
            CurveForm::Weierstrass(p) => &p.order,
            CurveForm::Edwards(p) => &p.order,
            CurveForm::Koblitz(p) => &p.order,
        }
    }

    fn generator(&self) -> AffinePoint {
        match self {
            CurveForm::Weierstrass(p) => p.g.clone(),
            CurveForm::Edwards(p) => p.g.clone(),
            CurveForm::Koblitz(p) => p.g.clone(),
        }
    }
}

/// A named curve: the catalogue's unit of lookup, and the engine's unit of
/// dispatch. Every operation below routes to the form-specific module based
/// on `self.form`.
#[derive(Debug, Clone)]
pub struct Curve {
    /// Catalogue name (e.g. `"secp256k1"`).
    pub name: &'static str,
    /// Curve shape and parameters.
    pub form: CurveForm,
}

impl Curve {
    /// The identity element: symbolic infinity for Weierstrass/Koblitz,
    /// `(0, 1)` for twisted Edwards.
    pub fn identity(&self) -> Point {
        match &self.form {
            CurveForm::Weierstrass(_) | CurveForm::Koblitz(_) => None,
            CurveForm::Edwards(p) => Some(AffinePoint::new(BigUint::zero(), BigUint::from(1u8) % &p.p)),
        }
    }

    /// The base point `G`.
    pub fn generator(&self) -> Point {
        Some(self.form.generator())
    }

    /// Order of the base point's subgroup.
    pub fn order(&self) -> &BigUint {
        self.form.order()
    }

    /// Whether `point` satisfies this curve's defining equation. The
    /// identity element always does.
    pub fn is_on_curve(&self, point: &Point) -> bool {
        let Some(p) = point else { return true };
        match &self.form {
            CurveForm::Weierstrass(params) => weierstrass::is_on_curve(params, p),
            CurveForm::Edwards(params) => edwards::is_on_curve(params, p),
            CurveForm::Koblitz(params) => koblitz::is_on_curve(params, p),
        }
    }

    /// `-P`.
    pub fn negate(&self, point: &Point) -> Point {
        match &self.form {
            CurveForm::Weierstrass(params) => weierstrass::negate(params, point),
            CurveForm::Edwards(params) => edwards::negate(params, point),
            CurveForm::Koblitz(params) => koblitz::negate(params, point),
        }
    }

    /// `P + Q`, asserting the result lands back on the curve.
    pub fn add(&self, p: &Point, q: &Point) -> Result<Point> {
        let result = match &self.form {
            CurveForm::Weierstrass(params) => weierstrass::add(params, p, q),
            CurveForm::Edwards(params) => edwards::add(params, p, q),
            CurveForm::Koblitz(params) => koblitz::add(params, p, q),
        };
        self.assert_on_curve(&result)?;
        Ok(result)
    }

    /// `2P`, asserting the result lands back on the curve.
    pub fn double(&self, p: &Point) -> Result<Point> {
        let result = match &self.form {
            CurveForm::Weierstrass(params) => weierstrass::double(params, p),
            CurveForm::Edwards(params) => edwards::add(params, p, p),
            CurveForm::Koblitz(params) => koblitz::double(params, p),
        };
        self.assert_on_curve(&result)?;
        Ok(result)
    }

    /// `k·P` via left-to-right double-and-add, with the normalisations
    /// spec.md §4.4 specifies: `k ≡ 0 (mod n) → O`; `k < 0 → -(|k|·P)`;
    /// otherwise `k := k mod n`.
    pub fn scalar_multiply(&self, p: &Point, k: &BigInt) -> Result<Point> {
        let n = BigInt::from(self.order().clone());
        if (k % &n).is_zero() {
            return Ok(self.identity());
        }
        if k.is_negative() {
            let positive = self.scalar_multiply(p, &(-k))?;
            return Ok(self.negate(&positive));
        }
        let k = (k % &n).magnitude().clone();

        let mut result = self.identity();
        for i in (0..k.bits()).rev() {
            result = self.double(&result)?;
            if k.bit(i) {
                result = self.add(&result, p)?;
            }
        }
        Ok(result)
    }

    fn assert_on_curve(&self, point: &Point) -> Result<()> {
        if self.is_on_curve(point) {
            Ok(())
        } else {
            let (x, y) = match point {
                Some(p) => (p.x.to_string(), p.y.to_string()),
                None => ("∞".to_string(), "∞".to_string()),
            };
            Err(Error::PointNotOnCurve {
                curve: self.name,
                x,
                y,
            })
        }
    }
}
