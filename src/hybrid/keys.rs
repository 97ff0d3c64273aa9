//! Key material accepted and produced by the orchestrator.
//!
//! The two curves represent keys differently: X25519 uses raw 32-byte
//! strings, P-256 an integer scalar and an `(x, y)` point. [`KeyMaterial`]
//! carries either form, and each engine rejects the forms it does not use.

use std::fmt;

use num_bigint::BigUint;
use zeroize::Zeroize;

use crate::crypto::kdf::SecretInput;
use crate::crypto::p256::Point;

/// A private or public key in one of the supported representations.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Raw bytes (X25519 private keys and u-coordinates)
    Bytes(Vec<u8>),
    /// Integer scalar (P-256 private keys)
    Scalar(BigUint),
    /// Curve point (P-256 public keys)
    Point(Point),
}

impl KeyMaterial {
    /// Short name of the representation, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyMaterial::Bytes(_) => "byte string",
            KeyMaterial::Scalar(_) => "integer",
            KeyMaterial::Point(_) => "point",
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            KeyMaterial::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&BigUint> {
        match self {
            KeyMaterial::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            KeyMaterial::Point(point) => Some(point),
            _ => None,
        }
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        if let KeyMaterial::Bytes(bytes) = self {
            bytes.zeroize();
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMaterial::Bytes(bytes) => write!(f, "KeyMaterial::Bytes({} bytes)", bytes.len()),
            KeyMaterial::Scalar(_) => f.write_str("KeyMaterial::Scalar(..)"),
            KeyMaterial::Point(point) => write!(f, "KeyMaterial::Point({point:?})"),
        }
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        KeyMaterial::Bytes(bytes)
    }
}

impl From<&[u8]> for KeyMaterial {
    fn from(bytes: &[u8]) -> Self {
        KeyMaterial::Bytes(bytes.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for KeyMaterial {
    fn from(bytes: [u8; N]) -> Self {
        KeyMaterial::Bytes(bytes.to_vec())
    }
}

impl From<BigUint> for KeyMaterial {
    fn from(scalar: BigUint) -> Self {
        KeyMaterial::Scalar(scalar)
    }
}

impl From<Point> for KeyMaterial {
    fn from(point: Point) -> Self {
        KeyMaterial::Point(point)
    }
}

impl From<(BigUint, BigUint)> for KeyMaterial {
    fn from((x, y): (BigUint, BigUint)) -> Self {
        KeyMaterial::Point(Point::from_coordinates(x, y))
    }
}

/// Output of a key agreement, before key derivation.
#[derive(Clone, PartialEq, Eq)]
pub enum SharedSecret {
    /// X25519 result
    Bytes([u8; 32]),
    /// P-256 x-coordinate
    Integer(BigUint),
}

impl SharedSecret {
    /// Render as the hex string fed to key derivation.
    ///
    /// Byte secrets keep all 32 bytes (`0x` + 64 digits, leading zeros kept);
    /// integers use minimal lowercase digits (`0x0` for zero).
    pub fn to_hex_string(&self) -> String {
        match self {
            SharedSecret::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
            SharedSecret::Integer(value) => format!("0x{value:x}"),
        }
    }

    /// The secret in the form [`derive_key`](crate::crypto::derive_key) takes.
    pub fn to_secret_input(&self) -> SecretInput {
        SecretInput::Hex(self.to_hex_string())
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        if let SharedSecret::Bytes(bytes) = self {
            bytes.zeroize();
        }
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SharedSecret::Bytes(_) => f.write_str("SharedSecret::Bytes(..)"),
            SharedSecret::Integer(_) => f.write_str("SharedSecret::Integer(..)"),
        }
    }
}
