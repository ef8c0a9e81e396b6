//! Short Weierstrass point arithmetic: `y² = x³ + ax + b (mod p)`.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::Zero;

use super::{AffinePoint, Point, WeierstrassParams};
use crate::bigint::mod_inv;

fn to_signed(x: &BigUint) -> BigInt {
    BigInt::from(x.clone())
}

fn reduce(v: BigInt, p: &BigUint) -> BigUint {
    v.mod_floor(&BigInt::from(p.clone())).magnitude().clone()
}

pub fn is_on_curve(params: &WeierstrassParams, point: &AffinePoint) -> bool {
    let p = &params.p;
    let x = to_signed(&point.x);
    let y = to_signed(&point.y);
    let lhs = reduce(&y * &y, p);
    let rhs = reduce(&x * &x * &x + &params.a * &x + &params.b, p);
    lhs == rhs
}

pub fn negate(params: &WeierstrassParams, point: &Point) -> Point {
    point.as_ref().map(|pt| {
        let neg_y = reduce(-to_signed(&pt.y), &params.p);
        AffinePoint::new(pt.x.clone(), neg_y)
    })
}

/// `P + O = P`, `O + P = P`, `O + O = O`, `P + (-P) = O`, and the general
/// chord-and-tangent law, all as explicit branches (spec.md §4.4's
/// required edge cases).
pub fn add(params: &WeierstrassParams, p: &Point, q: &Point) -> Point {
    let (Some(p1), Some(p2)) = (p, q) else {
        return p.clone().or_else(|| q.clone());
    };
    if p1.x == p2.x {
        if p1.y != p2.y || p1.y.is_zero() {
            // P + (-P) = O, and the y = 0 double-at-infinity case.
            return None;
        }
        return double(params, &Some(p1.clone()));
    }

    let modulus = BigInt::from(params.p.clone());
    let x1 = to_signed(&p1.x);
    let y1 = to_signed(&p1.y);
    let x2 = to_signed(&p2.x);
    let y2 = to_signed(&p2.y);

    let num = (&y2 - &y1).mod_floor(&modulus);
    let den = (&x2 - &x1).mod_floor(&modulus);
    let beta = (&num * mod_inv(&den, &modulus).expect("distinct x implies invertible denominator"))
        .mod_floor(&modulus);

    let x3 = (&beta * &beta - &x1 - &x2).mod_floor(&modulus);
    let y3 = (&beta * (&x1 - &x3) - &y1).mod_floor(&modulus);

    Some(AffinePoint::new(x3.magnitude().clone(), y3.magnitude().clone()))
}

/// `2P`, with `double(point with y = 0) = O` handled explicitly.
pub fn double(params: &WeierstrassParams, p: &Point) -> Point {
    let Some(pt) = p else { return None };
    if pt.y.is_zero() {
        return None;
    }

    let modulus = BigInt::from(params.p.clone());
    let x1 = to_signed(&pt.x);
    let y1 = to_signed(&pt.y);

    let num = (BigInt::from(3) * &x1 * &x1 + &params.a).mod_floor(&modulus);
    let den = (BigInt::from(2) * &y1).mod_floor(&modulus);
    let beta = (&num * mod_inv(&den, &modulus).expect("y != 0 implies invertible denominator"))
        .mod_floor(&modulus);

    let x3 = (&beta * &beta - BigInt::from(2) * &x1).mod_floor(&modulus);
    let y3 = (&beta * (&x1 - &x3) - &y1).mod_floor(&modulus);

    Some(AffinePoint::new(x3.magnitude().clone(), y3.magnitude().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::catalogue;

    #[test]
    fn generator_is_on_curve() {
        let curve = catalogue::lookup("weierstrass", Some("secp256k1")).unwrap();
        assert!(curve.is_on_curve(&curve.generator()));
    }

    #[test]
    fn doubling_matches_adding_to_self() {
        let curve = catalogue::lookup("weierstrass", Some("secp256k1")).unwrap();
        let g = curve.generator();
        let doubled = curve.double(&g).unwrap();
        let added = curve.add(&g, &g).unwrap();
        assert_eq!(doubled, added);
    }

    #[test]
    fn point_plus_its_negation_is_identity() {
        let curve = catalogue::lookup("weierstrass", Some("secp256k1")).unwrap();
        let g = curve.generator();
        let neg_g = curve.negate(&g);
        assert_eq!(curve.add(&g, &neg_g).unwrap(), curve.identity());
    }

    #[test]
    fn identity_is_neutral() {
        let curve = catalogue::lookup("weierstrass", Some("secp256k1")).unwrap();
        let g = curve.generator();
        let o = curve.identity();
        assert_eq!(curve.add(&g, &o).unwrap(), g);
        assert_eq!(curve.add(&o, &g).unwrap(), g);
        assert_eq!(curve.add(&o, &o).unwrap(), o);
    }
}
