//! # hybridcrypt
//!
//! From-scratch AES-128, X25519, P-256 ECDH and HKDF, composed into a hybrid
//! message encryption scheme.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Hybrid orchestrator (curve choice, key shape checks)   │
//! ├─────────────────────────────────────────────────────────┤
//! │  Key agreement: X25519 ladder | P-256 double-and-add    │
//! ├─────────────────────────────────────────────────────────┤
//! │  HKDF-SHA256 (shared secret -> 128-bit AES key)         │
//! ├─────────────────────────────────────────────────────────┤
//! │  AES-128 core + ECB / CBC / CTR modes                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The orchestrator only uses CTR. ECB and CBC are standalone utilities.
//! Nothing in this crate authenticates ciphertext.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod crypto;
pub mod error;
pub mod hybrid;

pub use error::{Error, Result};
pub use hybrid::{Curve, EncryptedMessage, HybridConfig, HybridCrypto, KeyMaterial};

/// Curve selector used when none is configured
pub const DEFAULT_CURVE: &str = "25519";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_curve() {
        assert_eq!(DEFAULT_CURVE.parse::<Curve>().unwrap(), Curve::default());
        assert_eq!(HybridConfig::default().curve.as_str(), DEFAULT_CURVE);
        assert_eq!(HybridCrypto::default().curve(), Curve::X25519);
    }
}
