//! Twisted Edwards point arithmetic: `a·x² + y² = 1 + d·x²y² (mod p)`.
//!
//! Unlike Weierstrass/Koblitz, the unified addition law handles doubling and
//! the identity without special-casing, so `double` in [`super::Curve`] just
//! calls `add(P, P)`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use super::{AffinePoint, EdwardsParams, Point};
use crate::bigint::mod_inv;

fn to_signed(x: &num_bigint::BigUint) -> BigInt {
    BigInt::from(x.clone())
}

fn reduce(v: BigInt, p: &num_bigint::BigUint) -> num_bigint::BigUint {
    v.mod_floor(&BigInt::from(p.clone())).magnitude().clone()
}

pub fn is_on_curve(params: &EdwardsParams, point: &AffinePoint) -> bool {
    let p = &params.p;
    let x = to_signed(&point.x);
    let y = to_signed(&point.y);
    let lhs = reduce(&params.a * &x * &x + &y * &y, p);
    let rhs = reduce(BigInt::one() + &params.d * &x * &x * &y * &y, p);
    lhs == rhs
}

pub fn negate(params: &EdwardsParams, point: &Point) -> Point {
    point.as_ref().map(|pt| {
        let neg_x = reduce(-to_signed(&pt.x), &params.p);
        AffinePoint::new(neg_x, pt.y.clone())
    })
}

/// Unified addition law, valid for `P == Q` (doubling) as well as distinct
/// points.
pub fn add(params: &EdwardsParams, p: &Point, q: &Point) -> Point {
    let (Some(p1), Some(p2)) = (p, q) else {
        // Edwards curves never carry a symbolic infinity; an absent operand
        // only arises if a caller mixes curve forms, which the catalogue
        // prevents by construction.
        return p.clone().or_else(|| q.clone());
    };

    let modulus = BigInt::from(params.p.clone());
    let x1 = to_signed(&p1.x);
    let y1 = to_signed(&p1.y);
    let x2 = to_signed(&p2.x);
    let y2 = to_signed(&p2.y);

    let cross = (&x1 * &y2).mod_floor(&modulus);
    let cross_swap = (&y1 * &x2).mod_floor(&modulus);
    let dxxyy = (&params.d * &x1 * &x2 * &y1 * &y2).mod_floor(&modulus);

    let x_num = (&cross + &cross_swap).mod_floor(&modulus);
    let x_den = (BigInt::one() + &dxxyy).mod_floor(&modulus);
    let x3 = (&x_num * mod_inv(&x_den, &modulus).expect("1 + d*x1*x2*y1*y2 is invertible on a valid twisted Edwards curve"))
        .mod_floor(&modulus);

    let y_num = (&y1 * &y2 - &params.a * &x1 * &x2).mod_floor(&modulus);
    let y_den = (BigInt::one() - &dxxyy).mod_floor(&modulus);
    let y3 = (&y_num * mod_inv(&y_den, &modulus).expect("1 - d*x1*x2*y1*y2 is invertible on a valid twisted Edwards curve"))
        .mod_floor(&modulus);

    Some(AffinePoint::new(x3.magnitude().clone(), y3.magnitude().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::catalogue;

    #[test]
    fn generator_is_on_curve() {
        let curve = catalogue::lookup("edwards", Some("ed25519")).unwrap();
        assert!(curve.is_on_curve(&curve.generator()));
    }

    #[test]
    fn identity_is_neutral() {
        let curve = catalogue::lookup("edwards", Some("ed25519")).unwrap();
        let g = curve.generator();
        let o = curve.identity();
        assert_eq!(curve.add(&g, &o).unwrap(), g);
        assert_eq!(curve.add(&o, &g).unwrap(), g);
    }

    #[test]
    fn point_plus_its_negation_is_identity() {
        let curve = catalogue::lookup("edwards", Some("ed25519")).unwrap();
        let g = curve.generator();
        let neg_g = curve.negate(&g);
        assert_eq!(curve.add(&g, &neg_g).unwrap(), curve.identity());
    }
}
