//! Koblitz (binary anomalous) point arithmetic over `GF(2^m)`:
//! `y² + xy = x³ + ax² + b`. All field arithmetic is delegated to
//! [`crate::binary_field`].

use num_bigint::BigUint;
use num_traits::Zero;

use super::{AffinePoint, KoblitzParams, Point};
use crate::binary_field::{add as xor, divide, modulo, multiply, square};

pub fn is_on_curve(params: &KoblitzParams, point: &AffinePoint) -> bool {
    let m = &params.poly;
    let x = &point.x;
    let y = &point.y;
    let lhs = xor(&square(y), &modulo(&multiply(x, y), m));
    let x2 = modulo(&square(x), m);
    let x3 = modulo(&multiply(&x2, x), m);
    let rhs = xor(&x3, &xor(&modulo(&multiply(&params.a, &x2), m), params.b.clone()));
    modulo(&lhs, m) == modulo(&rhs, m)
}

pub fn negate(_params: &KoblitzParams, point: &Point) -> Point {
    point
        .as_ref()
        .map(|pt| AffinePoint::new(pt.x.clone(), xor(&pt.x, &pt.y)))
}

/// `P + O = P`, `O + P = P`, `O + O = O`, `P + (-P) = O`, and the general
/// chord-and-tangent law over GF(2^m).
pub fn add(params: &KoblitzParams, p: &Point, q: &Point) -> Point {
    let (Some(p1), Some(p2)) = (p, q) else {
        return p.clone().or_else(|| q.clone());
    };
    let m = &params.poly;
    if p1.x == p2.x {
        if p1.y != p2.y || p1.x.is_zero() {
            return None;
        }
        return double(params, &Some(p1.clone()));
    }

    let beta = divide(&xor(&p1.y, &p2.y), &xor(&p1.x, &p2.x), m)
        .expect("distinct x implies an invertible denominator over GF(2^m)");
    let beta2 = modulo(&square(&beta), m);
    let x3 = xor(&xor(&beta2, &beta), &xor(&xor(&p1.x, &p2.x), &params.a));
    let x3 = modulo(&x3, m);
    let y3 = xor(
        &modulo(&multiply(&beta, &xor(&p1.x, &x3)), m),
        &xor(&x3, &p1.y),
    );

    Some(AffinePoint::new(x3, modulo(&y3, m)))
}

/// `2P`, with `double(point with x = 0) = O` handled explicitly.
pub fn double(params: &KoblitzParams, p: &Point) -> Point {
    let Some(pt) = p else { return None };
    let m = &params.poly;
    if pt.x.is_zero() {
        return None;
    }

    let beta = xor(&pt.x, &divide(&pt.y, &pt.x, m).expect("x != 0 implies an invertible denominator"));
    let beta2 = modulo(&square(&beta), m);
    let x3 = modulo(&xor(&xor(&beta2, &beta), &params.a), m);
    let x2 = modulo(&square(&pt.x), m);
    let y3 = xor(&x2, &xor(&modulo(&multiply(&beta, &x3), m), &x3));

    Some(AffinePoint::new(x3, modulo(&y3, m)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::catalogue;

    #[test]
    fn generator_is_on_curve() {
        let curve = catalogue::lookup("koblitz", Some("k163")).unwrap();
        assert!(curve.is_on_curve(&curve.generator()));
    }

    #[test]
    fn identity_is_neutral() {
        let curve = catalogue::lookup("koblitz", Some("k163")).unwrap();
        let g = curve.generator();
        let o = curve.identity();
        assert_eq!(curve.add(&g, &o).unwrap(), g);
        assert_eq!(curve.add(&o, &g).unwrap(), g);
    }

    #[test]
    fn point_plus_its_negation_is_identity() {
        let curve = catalogue::lookup("koblitz", Some("k163")).unwrap();
        let g = curve.generator();
        let neg_g = curve.negate(&g);
        assert_eq!(curve.add(&g, &neg_g).unwrap(), curve.identity());
    }
}
