//! The six concrete end-to-end scenarios, run against the public [`Facade`]
//! API rather than any single scheme's internals.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use phe::{Decrypted, Encrypted, Facade, FacadeOptions, Plaintext};

fn int(v: i64) -> Plaintext {
    Plaintext::Int(BigInt::from(v))
}

fn decrypted_int(v: u64) -> Decrypted {
    Decrypted::Int(BigUint::from(v))
}

#[test]
fn paillier_add_and_scalar_multiply() {
    let facade = Facade::construct(
        "Paillier",
        FacadeOptions {
            key_size: Some(1024),
            ..Default::default()
        },
    )
    .unwrap();

    let c1 = facade.encrypt(int(17)).unwrap();
    let c2 = facade.encrypt(int(21)).unwrap();

    let sum = (c1.as_scalar().unwrap() + c2.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(sum)).unwrap(), decrypted_int(38));

    let scaled = c1.as_scalar().unwrap().mul_scalar(&BigUint::from(21u32)).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(scaled)).unwrap(), decrypted_int(357));
}

#[test]
fn rsa_multiply() {
    let facade = Facade::construct(
        "RSA",
        FacadeOptions {
            key_size: Some(256),
            ..Default::default()
        },
    )
    .unwrap();

    let c1 = facade.encrypt(int(9)).unwrap();
    let c2 = facade.encrypt(int(11)).unwrap();

    let product = (c1.as_scalar().unwrap() * c2.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(product)).unwrap(), decrypted_int(99));
}

#[test]
fn exponential_elgamal_add_and_scalar_multiply() {
    let facade = Facade::construct(
        "Exponential-ElGamal",
        FacadeOptions {
            key_size: Some(256),
            ..Default::default()
        },
    )
    .unwrap();

    let c1 = facade.encrypt(int(17)).unwrap();
    let c2 = facade.encrypt(int(21)).unwrap();

    let sum = (c1.as_scalar().unwrap() + c2.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(sum)).unwrap(), decrypted_int(38));

    let scaled = c1.as_scalar().unwrap().mul_scalar(&BigUint::from(5u32)).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(scaled)).unwrap(), decrypted_int(85));
}

#[test]
fn goldwasser_micali_xor() {
    let facade = Facade::construct(
        "Goldwasser-Micali",
        FacadeOptions {
            key_size: Some(128),
            ..Default::default()
        },
    )
    .unwrap();

    // 17 = 0b10001, 27 = 0b11011, both five bits wide so their ciphertext
    // bit vectors line up for xor without padding.
    let c1 = facade.encrypt(int(17)).unwrap();
    let c2 = facade.encrypt(int(27)).unwrap();

    let xored = (c1.as_scalar().unwrap() ^ c2.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(xored)).unwrap(), decrypted_int(10));
}

#[test]
fn ec_elgamal_on_secp256k1_add_and_scalar_multiply() {
    let facade = Facade::construct(
        "EllipticCurve-ElGamal",
        FacadeOptions {
            form: Some("weierstrass".to_string()),
            curve: Some("secp256k1".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let c1 = facade.encrypt(int(10)).unwrap();
    let c2 = facade.encrypt(int(5)).unwrap();

    let sum = (c1.as_scalar().unwrap() + c2.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(sum)).unwrap(), decrypted_int(15));

    let scaled = c1.as_scalar().unwrap().mul_scalar(&BigUint::from(5u32)).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(scaled)).unwrap(), decrypted_int(50));
}

#[test]
fn salary_scenario_add_then_percentage_increase() {
    let facade = Facade::construct(
        "Paillier",
        FacadeOptions {
            key_size: Some(1024),
            ..Default::default()
        },
    )
    .unwrap();

    let base = facade.encrypt(int(10_000)).unwrap();
    let raise = facade.encrypt(int(1_000)).unwrap();
    let total = (base.as_scalar().unwrap() + raise.as_scalar().unwrap()).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(total.clone())).unwrap(), decrypted_int(11_000));

    // A 1.05x multiplier expressed as an exact modular constant:
    // 105 * mod_inv(100, n) mod n, so that dividing back out by 100 during
    // decryption falls out of Paillier's own modular exponentiation instead
    // of needing a floating-point scalar multiply.
    let phe::PublicKey::Paillier { n, .. } = &facade.keys().public else {
        panic!("expected a Paillier public key");
    };
    let n_signed = BigInt::from(n.clone());
    let hundred_inv = phe_core::bigint::mod_inv(&BigInt::from(100), &n_signed).unwrap();
    let multiplier = (BigInt::from(105) * hundred_inv).mod_floor(&n_signed).magnitude().clone();

    let scaled = total.mul_scalar(&multiplier).unwrap();
    assert_eq!(facade.decrypt(&Encrypted::Scalar(scaled)).unwrap(), decrypted_int(11_550));
}
