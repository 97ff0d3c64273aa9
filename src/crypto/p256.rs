//! ECDH over NIST P-256 (secp256r1) in affine coordinates.
//!
//! Points are `(x, y)` pairs of integers below `p`, with [`Point::Identity`]
//! standing in for the point at infinity. The pair `(0, 0)` is not on the
//! curve and is read as the identity.
//!
//! Scalar multiplication is plain double-and-add over the scalar bits, least
//! significant first. Its running time depends on the scalar, so it leaks
//! timing information about private keys.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::random::SecureRandom;
use crate::error::{Error, Result};

/// Domain parameters of the curve `y^2 = x^3 + a*x + b (mod p)`.
#[derive(Debug)]
pub struct CurveParams {
    pub p: BigUint,
    pub a: BigUint,
    pub b: BigUint,
    pub gx: BigUint,
    pub gy: BigUint,
    pub n: BigUint,
}

fn hex_const(s: &str) -> BigUint {
    // Only called on the literal constants below.
    BigUint::parse_bytes(s.as_bytes(), 16).unwrap_or_default()
}

/// The P-256 parameters, parsed once on first use.
pub fn curve() -> &'static CurveParams {
    static PARAMS: OnceLock<CurveParams> = OnceLock::new();
    PARAMS.get_or_init(|| {
        let p = hex_const("ffffffff00000001000000000000000000000000ffffffffffffffffffffffff");
        let a = &p - 3u32;
        CurveParams {
            a,
            b: hex_const("5ac635d8aa3a93e7b3ebbd55769886bc651d06b0cc53b0f63bce3c3e27d2604b"),
            gx: hex_const("6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296"),
            gy: hex_const("4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5"),
            n: hex_const("ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551"),
            p,
        }
    })
}

/// A point on P-256, or the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Point {
    Identity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    /// Build a point from raw coordinates. `(0, 0)` maps to [`Point::Identity`].
    ///
    /// No curve check is done here; see [`is_on_curve`] and [`validate_public_key`].
    pub fn from_coordinates(x: BigUint, y: BigUint) -> Self {
        if x.is_zero() && y.is_zero() {
            Point::Identity
        } else {
            Point::Affine { x, y }
        }
    }

    /// The base point `G`.
    pub fn generator() -> Self {
        let params = curve();
        Point::Affine {
            x: params.gx.clone(),
            y: params.gy.clone(),
        }
    }

    /// Coordinates as a pair, with the identity rendered as `(0, 0)`.
    pub fn coordinates(&self) -> (BigUint, BigUint) {
        match self {
            Point::Identity => (BigUint::zero(), BigUint::zero()),
            Point::Affine { x, y } => (x.clone(), y.clone()),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Point::Identity)
    }
}

fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    ((a % p) + p - (b % p)) % p
}

/// Modular inverse by Fermat's little theorem; `p` is prime.
fn inv_mod(a: &BigUint, p: &BigUint) -> BigUint {
    a.modpow(&(p - 2u32), p)
}

/// Add two points.
///
/// Equal points use the tangent slope, distinct x-coordinates the secant
/// slope. A vertical line (equal x, or doubling a point with `y = 0`) gives
/// the identity.
pub fn add(lhs: &Point, rhs: &Point) -> Point {
    let (x1, y1, x2, y2) = match (lhs, rhs) {
        (Point::Identity, _) => return rhs.clone(),
        (_, Point::Identity) => return lhs.clone(),
        (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => (x1, y1, x2, y2),
    };
    let params = curve();
    let p = &params.p;

    let slope = if lhs == rhs {
        if y1.is_zero() {
            return Point::Identity;
        }
        let numerator = (BigUint::from(3u32) * x1 * x1 + &params.a) % p;
        let denominator = (BigUint::from(2u32) * y1) % p;
        numerator * inv_mod(&denominator, p) % p
    } else if x1 == x2 {
        return Point::Identity;
    } else {
        sub_mod(y2, y1, p) * inv_mod(&sub_mod(x2, x1, p), p) % p
    };

    let x3 = sub_mod(&(&slope * &slope), &(x1 + x2), p);
    let y3 = sub_mod(&(&slope * sub_mod(x1, &x3, p)), y1, p);
    Point::Affine { x: x3, y: y3 }
}

/// Double a point.
pub fn double(point: &Point) -> Point {
    add(point, point)
}

/// Multiply `point` by `scalar` with double-and-add, least significant bit first.
pub fn scalar_mul(point: &Point, scalar: &BigUint) -> Point {
    let mut result = Point::Identity;
    let mut current = point.clone();
    for i in 0..scalar.bits() {
        if scalar.bit(i) {
            result = add(&result, &current);
        }
        current = double(&current);
    }
    result
}

/// Check `y^2 = x^3 + a*x + b (mod p)` with both coordinates below `p`.
///
/// The identity counts as on the curve.
pub fn is_on_curve(point: &Point) -> bool {
    let (x, y) = match point {
        Point::Identity => return true,
        Point::Affine { x, y } => (x, y),
    };
    let params = curve();
    let p = &params.p;
    if x >= p || y >= p {
        return false;
    }
    let lhs = y * y % p;
    let rhs = (x * x * x + &params.a * x + &params.b) % p;
    lhs == rhs
}

fn check_public_point(public_key: &Point) -> Result<()> {
    if public_key.is_identity() {
        tracing::debug!("rejected P-256 identity public key");
        return Err(Error::invalid_point("public key is the point at infinity"));
    }
    if !is_on_curve(public_key) {
        tracing::debug!("rejected off-curve P-256 public key");
        return Err(Error::invalid_point("public key is not on the curve"));
    }
    Ok(())
}

/// Generate a private scalar uniform in `[1, n-1]` and its public point.
pub fn generate_keypair() -> (BigUint, Point) {
    let private_key = SecureRandom::biguint_range(&BigUint::one(), &curve().n);
    let public_key = scalar_mul(&Point::generator(), &private_key);
    (private_key, public_key)
}

/// Compute the x-coordinate of `private_key * public_key`.
///
/// # Errors
///
/// [`Error::KeyRange`] if the scalar is outside `[1, n-1]`;
/// [`Error::InvalidPoint`] if the public key is the identity or not on the
/// curve. Subgroup membership is not checked here; use
/// [`validate_public_key`] for keys from an untrusted peer.
pub fn shared_secret(private_key: &BigUint, public_key: &Point) -> Result<BigUint> {
    if private_key.is_zero() || private_key >= &curve().n {
        return Err(Error::KeyRange);
    }
    check_public_point(public_key)?;

    let (x, _) = scalar_mul(public_key, private_key).coordinates();
    Ok(x)
}

/// Full validation of a peer public key: not the identity, on the curve, and
/// of order `n`.
pub fn validate_public_key(public_key: &Point) -> Result<()> {
    check_public_point(public_key)?;
    if !scalar_mul(public_key, &curve().n).is_identity() {
        tracing::debug!("rejected P-256 public key outside the prime-order subgroup");
        return Err(Error::invalid_point("public key is not in the prime-order subgroup"));
    }
    Ok(())
}
