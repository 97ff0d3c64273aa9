//! X25519 Diffie-Hellman over Curve25519 (RFC 7748).
//!
//! Scalars and u-coordinates are 32-byte little-endian strings. The ladder
//! always runs 256 iterations and selects with [`FieldElement::conditional_swap`],
//! never with a branch on a key bit.

use zeroize::Zeroize;

use super::field25519::FieldElement;
use super::random::SecureRandom;
use crate::error::{Error, Result};

/// Size of scalars and u-coordinates in bytes.
pub const KEY_SIZE: usize = 32;

/// u-coordinate of the base point.
pub const BASE_POINT: [u8; KEY_SIZE] = {
    let mut u = [0u8; KEY_SIZE];
    u[0] = 9;
    u
};

/// `(A - 2) / 4` for `A = 486662`.
const A24: u32 = 121_665;

/// Clear bits 0, 1, 2 and 255 and set bit 254.
pub fn clamp(scalar: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    let mut clamped = *scalar;
    clamped[0] &= 0xf8;
    clamped[31] &= 0x7f;
    clamped[31] |= 0x40;
    clamped
}

/// Montgomery ladder over all 256 bits of `k`, most significant first.
///
/// `k` is used exactly as given (no clamping). Returns `x2 / z2`, which is
/// zero when `z2` is zero.
pub fn montgomery_ladder(k: &[u8; KEY_SIZE], u: &FieldElement) -> FieldElement {
    let x1 = *u;
    let mut x2 = FieldElement::ONE;
    let mut z2 = FieldElement::ZERO;
    let mut x3 = *u;
    let mut z3 = FieldElement::ONE;

    for i in (0..256).rev() {
        let bit = (k[i / 8] >> (i % 8)) & 1;
        FieldElement::conditional_swap(&mut x2, &mut x3, bit);
        FieldElement::conditional_swap(&mut z2, &mut z3, bit);

        let a = x2.add(&z2);
        let aa = a.square();
        let b = x2.sub(&z2);
        let bb = b.square();
        let e = aa.sub(&bb);
        let c = x3.add(&z3);
        let d = x3.sub(&z3);
        let da = d.mul(&a);
        let cb = c.mul(&b);

        x3 = da.add(&cb).square();
        z3 = x1.mul(&da.sub(&cb).square());
        x2 = aa.mul(&bb);
        z2 = e.mul(&aa.add(&e.mul_small(A24)));

        FieldElement::conditional_swap(&mut x2, &mut x3, bit);
        FieldElement::conditional_swap(&mut z2, &mut z3, bit);
    }

    let result = x2.mul(&z2.invert());
    x2.zeroize();
    z2.zeroize();
    x3.zeroize();
    z3.zeroize();
    result
}

/// The X25519 function: clamp `k`, mask bit 255 of `u`, run the ladder.
pub fn x25519(k: &[u8; KEY_SIZE], u: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    let mut scalar = clamp(k);
    let result = montgomery_ladder(&scalar, &FieldElement::from_bytes(u));
    scalar.zeroize();
    result.to_bytes()
}

/// Multiply the base point by `k`.
pub fn x25519_base(k: &[u8; KEY_SIZE]) -> [u8; KEY_SIZE] {
    x25519(k, &BASE_POINT)
}

/// Generate a private key of 32 random bytes and its public u-coordinate.
pub fn generate_keypair() -> ([u8; KEY_SIZE], [u8; KEY_SIZE]) {
    let private_key: [u8; KEY_SIZE] = SecureRandom::bytes();
    let public_key = x25519_base(&private_key);
    (private_key, public_key)
}

/// Compute the shared secret between a private key and a peer's public key.
///
/// # Errors
///
/// [`Error::Length`] if either key is not exactly 32 bytes, and
/// [`Error::InvalidPoint`] for the all-zero public key.
pub fn shared_secret(private_key: &[u8], public_key: &[u8]) -> Result<[u8; KEY_SIZE]> {
    let private_key: &[u8; KEY_SIZE] = private_key
        .try_into()
        .map_err(|_| Error::length("X25519 private key", KEY_SIZE, private_key.len()))?;
    let public_key: &[u8; KEY_SIZE] = public_key
        .try_into()
        .map_err(|_| Error::length("X25519 public key", KEY_SIZE, public_key.len()))?;

    if public_key.iter().all(|&b| b == 0) {
        tracing::debug!("rejected all-zero X25519 public key");
        return Err(Error::invalid_point("all-zero X25519 public key"));
    }

    Ok(x25519(private_key, public_key))
}
