//! Cryptographic primitives for hybridcrypt.
//!
//! This module provides:
//! - AES-128 with ECB, CBC and CTR modes
//! - X25519 Diffie-Hellman over Curve25519
//! - ECDH over NIST P-256
//! - HKDF-SHA256 key derivation
//! - Secure random number generation
//!
//! None of the modes authenticate their output.

pub mod aes;
mod field25519;
pub mod kdf;
pub mod p256;
mod random;
pub mod x25519;

pub use aes::{Aes128, AesCtr};
pub use field25519::FieldElement;
pub use kdf::{derive_key, derive_key_bytes, Hkdf, SecretInput};
pub use random::SecureRandom;

/// Size of AES-128 keys in bytes
pub const AES_KEY_SIZE: usize = aes::KEY_SIZE;

/// Size of the CTR nonce in bytes
pub const NONCE_SIZE: usize = aes::NONCE_SIZE;

/// Size of X25519 keys and shared secrets in bytes
pub const X25519_KEY_SIZE: usize = x25519::KEY_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x25519_exchange_and_ctr_encryption() {
        let (alice_private, alice_public) = x25519::generate_keypair();
        let (bob_private, bob_public) = x25519::generate_keypair();

        let alice_shared = x25519::shared_secret(&alice_private, &bob_public).unwrap();
        let bob_shared = x25519::shared_secret(&bob_private, &alice_public).unwrap();
        assert_eq!(alice_shared, bob_shared);

        let alice_key = derive_key_bytes(&SecretInput::from(hex::encode(alice_shared))).unwrap();
        let bob_key = derive_key_bytes(&SecretInput::from(hex::encode(bob_shared))).unwrap();
        assert_eq!(alice_key, bob_key);

        let nonce: [u8; NONCE_SIZE] = SecureRandom::bytes();
        let ciphertext = aes::ctr::encrypt(b"Hello, secure world!", &alice_key, &nonce).unwrap();
        let plaintext = aes::ctr::decrypt(&ciphertext, &bob_key, &nonce).unwrap();
        assert_eq!(plaintext, b"Hello, secure world!");
    }

    #[test]
    fn test_p256_exchange_and_cbc_encryption() {
        let (alice_private, alice_public) = p256::generate_keypair();
        let (bob_private, bob_public) = p256::generate_keypair();

        p256::validate_public_key(&bob_public).unwrap();
        p256::validate_public_key(&alice_public).unwrap();

        let alice_shared = p256::shared_secret(&alice_private, &bob_public).unwrap();
        let bob_shared = p256::shared_secret(&bob_private, &alice_public).unwrap();
        assert_eq!(alice_shared, bob_shared);

        let key = derive_key_bytes(&SecretInput::from(alice_shared)).unwrap();
        let iv: [u8; 16] = SecureRandom::bytes();
        let ciphertext = aes::cbc::encrypt(b"block chained", &key, &iv).unwrap();
        assert_eq!(aes::cbc::decrypt(&ciphertext, &key, &iv).unwrap(), b"block chained");
    }
}
