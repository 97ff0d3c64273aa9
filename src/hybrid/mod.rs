//! Hybrid encryption: ECDH key agreement, HKDF key derivation, AES-CTR.
//!
//! Both parties derive the same AES-128 key from their own private key and
//! the other side's public key. Every message gets a fresh random 8-byte
//! nonce. Ciphertexts carry no authentication tag; a wrong key or nonce
//! usually shows up as invalid UTF-8 on decryption, but not always.
//!
//! ```no_run
//! use hybridcrypt::hybrid::HybridCrypto;
//!
//! let crypto = HybridCrypto::new("25519")?;
//! let (alice_private, alice_public) = crypto.generate_keypair();
//! let (bob_private, bob_public) = crypto.generate_keypair();
//!
//! let sealed = crypto.encrypt(&alice_private, &bob_public, "hola")?;
//! let opened = crypto.decrypt(&bob_private, &alice_public, &sealed.nonce, &sealed.ciphertext)?;
//! assert_eq!(opened, "hola");
//! # Ok::<(), hybridcrypt::Error>(())
//! ```

mod config;
mod keys;

pub use config::{Curve, HybridConfig};
pub use keys::{KeyMaterial, SharedSecret};

use zeroize::Zeroizing;

use crate::crypto::aes::{self, NONCE_SIZE};
use crate::crypto::kdf::{self, DERIVED_KEY_SIZE};
use crate::crypto::{p256, x25519, SecureRandom};
use crate::error::{Error, Result};

/// Key pair generation and shared secret computation for one curve.
pub trait KeyAgreement {
    /// The curve this engine implements.
    fn curve(&self) -> Curve;

    /// Generate a `(private, public)` key pair.
    fn generate_keypair(&self) -> (KeyMaterial, KeyMaterial);

    /// Check that both keys have the representation this curve uses.
    fn check_key_shapes(&self, private_key: &KeyMaterial, public_key: &KeyMaterial) -> Result<()>;

    /// Compute the shared secret after checking key shapes.
    fn shared_secret(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<SharedSecret>;
}

/// X25519 key agreement over raw 32-byte keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Engine {
    strict: bool,
}

impl X25519Engine {
    /// With `strict`, an all-zero shared secret (a low-order peer key) is rejected.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl KeyAgreement for X25519Engine {
    fn curve(&self) -> Curve {
        Curve::X25519
    }

    fn generate_keypair(&self) -> (KeyMaterial, KeyMaterial) {
        let (private_key, public_key) = x25519::generate_keypair();
        (private_key.into(), public_key.into())
    }

    fn check_key_shapes(&self, private_key: &KeyMaterial, public_key: &KeyMaterial) -> Result<()> {
        for (role, key) in [("private", private_key), ("public", public_key)] {
            match key.as_bytes() {
                Some(bytes) if bytes.len() == x25519::KEY_SIZE => {}
                Some(bytes) => {
                    return Err(Error::key_shape(format!(
                        "X25519 {role} key must be 32 bytes, got {}",
                        bytes.len()
                    )))
                }
                None => {
                    return Err(Error::key_shape(format!(
                        "X25519 {role} key must be a byte string, got {}",
                        key.kind()
                    )))
                }
            }
        }
        Ok(())
    }

    fn shared_secret(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<SharedSecret> {
        self.check_key_shapes(private_key, public_key)?;
        let (Some(private_key), Some(public_key)) = (private_key.as_bytes(), public_key.as_bytes())
        else {
            return Err(Error::key_shape("X25519 keys must be byte strings"));
        };

        let secret = SharedSecret::Bytes(x25519::shared_secret(private_key, public_key)?);
        if self.strict {
            if let SharedSecret::Bytes(bytes) = &secret {
                if bytes.iter().all(|&b| b == 0) {
                    tracing::debug!("rejected low-order X25519 public key");
                    return Err(Error::invalid_point("X25519 public key has low order"));
                }
            }
        }
        Ok(secret)
    }
}

/// ECDH over P-256 with integer private keys and point public keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct P256Engine {
    strict: bool,
}

impl P256Engine {
    /// With `strict`, peer keys also pass the subgroup check.
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }
}

impl KeyAgreement for P256Engine {
    fn curve(&self) -> Curve {
        Curve::Secp256r1
    }

    fn generate_keypair(&self) -> (KeyMaterial, KeyMaterial) {
        let (private_key, public_key) = p256::generate_keypair();
        (private_key.into(), public_key.into())
    }

    fn check_key_shapes(&self, private_key: &KeyMaterial, public_key: &KeyMaterial) -> Result<()> {
        if private_key.as_scalar().is_none() {
            return Err(Error::key_shape(format!(
                "secp256r1 private key must be an integer, got {}",
                private_key.kind()
            )));
        }
        if public_key.as_point().is_none() {
            return Err(Error::key_shape(format!(
                "secp256r1 public key must be an (x, y) point, got {}",
                public_key.kind()
            )));
        }
        Ok(())
    }

    fn shared_secret(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<SharedSecret> {
        self.check_key_shapes(private_key, public_key)?;
        let (Some(private_key), Some(public_key)) = (private_key.as_scalar(), public_key.as_point())
        else {
            return Err(Error::key_shape("secp256r1 keys must be an integer and a point"));
        };

        if self.strict {
            p256::validate_public_key(public_key)?;
        }
        Ok(SharedSecret::Integer(p256::shared_secret(private_key, public_key)?))
    }
}

/// The engine chosen at construction.
#[derive(Debug, Clone, Copy)]
pub enum Engine {
    X25519(X25519Engine),
    P256(P256Engine),
}

impl Engine {
    /// The engine for `curve`.
    pub fn for_curve(curve: Curve, strict: bool) -> Self {
        match curve {
            Curve::X25519 => Engine::X25519(X25519Engine::new(strict)),
            Curve::Secp256r1 => Engine::P256(P256Engine::new(strict)),
        }
    }

    fn inner(&self) -> &dyn KeyAgreement {
        match self {
            Engine::X25519(engine) => engine,
            Engine::P256(engine) => engine,
        }
    }
}

impl KeyAgreement for Engine {
    fn curve(&self) -> Curve {
        self.inner().curve()
    }

    fn generate_keypair(&self) -> (KeyMaterial, KeyMaterial) {
        self.inner().generate_keypair()
    }

    fn check_key_shapes(&self, private_key: &KeyMaterial, public_key: &KeyMaterial) -> Result<()> {
        self.inner().check_key_shapes(private_key, public_key)
    }

    fn shared_secret(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<SharedSecret> {
        self.inner().shared_secret(private_key, public_key)
    }
}

/// Nonce and ciphertext produced by [`HybridCrypto::encrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedMessage {
    pub fn into_parts(self) -> ([u8; NONCE_SIZE], Vec<u8>) {
        (self.nonce, self.ciphertext)
    }
}

/// ECDH + HKDF + AES-CTR message encryption for one curve.
#[derive(Debug, Clone)]
pub struct HybridCrypto {
    engine: Engine,
}

impl HybridCrypto {
    /// Build from a curve selector, `"25519"` or `"secp256r1"`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for any other selector.
    pub fn new(curve: &str) -> Result<Self> {
        Ok(Self::with_curve(curve.parse()?))
    }

    pub fn with_curve(curve: Curve) -> Self {
        Self::from_config(&HybridConfig::new(curve))
    }

    pub fn from_config(config: &HybridConfig) -> Self {
        tracing::debug!(
            curve = %config.curve,
            strict = config.strict_public_keys,
            "hybrid crypto initialized"
        );
        Self {
            engine: Engine::for_curve(config.curve, config.strict_public_keys),
        }
    }

    pub fn curve(&self) -> Curve {
        self.engine.curve()
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Generate a key pair on the configured curve.
    pub fn generate_keypair(&self) -> (KeyMaterial, KeyMaterial) {
        self.engine.generate_keypair()
    }

    /// Compute the raw shared secret on the configured curve.
    pub fn shared_secret(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<SharedSecret> {
        self.engine.shared_secret(private_key, public_key)
    }

    /// Derive the AES-128 key both parties share.
    pub fn derive_key(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
    ) -> Result<Zeroizing<[u8; DERIVED_KEY_SIZE]>> {
        let secret = self.shared_secret(private_key, public_key)?;
        let input = secret.to_secret_input();
        Ok(Zeroizing::new(kdf::derive_key_bytes(&input)?))
    }

    /// Encrypt `message` for the holder of `public_key` under a fresh random nonce.
    pub fn encrypt(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
        message: &str,
    ) -> Result<EncryptedMessage> {
        self.engine.check_key_shapes(private_key, public_key)?;
        let nonce: [u8; NONCE_SIZE] = SecureRandom::bytes();
        self.encrypt_with_nonce(private_key, public_key, message, nonce)
    }

    /// Encrypt with a caller-chosen nonce.
    ///
    /// Reusing a nonce between the same two keys reuses keystream.
    pub fn encrypt_with_nonce(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
        message: &str,
        nonce: [u8; NONCE_SIZE],
    ) -> Result<EncryptedMessage> {
        let key = self.derive_key(private_key, public_key)?;
        let ciphertext = aes::ctr::encrypt(message.as_bytes(), key.as_slice(), &nonce)?;
        tracing::debug!(curve = %self.curve(), len = ciphertext.len(), "message encrypted");
        Ok(EncryptedMessage { nonce, ciphertext })
    }

    /// Decrypt a message from the holder of `public_key`.
    ///
    /// # Errors
    ///
    /// [`Error::Length`] for a nonce that is not 8 bytes and [`Error::Decode`]
    /// when the plaintext is not valid UTF-8, besides the key errors of
    /// [`encrypt`](Self::encrypt).
    pub fn decrypt(
        &self,
        private_key: &KeyMaterial,
        public_key: &KeyMaterial,
        nonce: &[u8],
        ciphertext: &[u8],
    ) -> Result<String> {
        self.engine.check_key_shapes(private_key, public_key)?;
        let nonce: &[u8; NONCE_SIZE] = nonce
            .try_into()
            .map_err(|_| Error::length("CTR nonce", NONCE_SIZE, nonce.len()))?;

        let key = self.derive_key(private_key, public_key)?;
        let plaintext = aes::ctr::decrypt(ciphertext, key.as_slice(), nonce)?;
        tracing::debug!(curve = %self.curve(), len = plaintext.len(), "message decrypted");

        String::from_utf8(plaintext).map_err(|e| {
            tracing::debug!("decrypted bytes are not valid UTF-8");
            Error::decode(format!("decrypted message is not valid UTF-8: {}", e.utf8_error()))
        })
    }
}

impl Default for HybridCrypto {
    fn default() -> Self {
        Self::with_curve(Curve::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    const MESSAGES: [&str; 5] = [
        "Hola, mundo",
        "",
        "Criptografía: ñandú, acción, pingüino",
        "emoji 🔐 and CJK 暗号",
        "a",
    ];

    fn roundtrip(crypto: &HybridCrypto) {
        let (alice_private, alice_public) = crypto.generate_keypair();
        let (bob_private, bob_public) = crypto.generate_keypair();

        for message in MESSAGES {
            let sealed = crypto.encrypt(&alice_private, &bob_public, message).unwrap();
            assert_eq!(sealed.ciphertext.len(), message.len());

            let opened = crypto
                .decrypt(&bob_private, &alice_public, &sealed.nonce, &sealed.ciphertext)
                .unwrap();
            assert_eq!(opened, message);
        }
    }

    #[test]
    fn test_roundtrip_x25519() {
        roundtrip(&HybridCrypto::new("25519").unwrap());
    }

    #[test]
    fn test_roundtrip_secp256r1() {
        roundtrip(&HybridCrypto::new("secp256r1").unwrap());
    }

    #[test]
    fn test_roundtrip_strict_mode() {
        for curve in Curve::all() {
            let config = HybridConfig::new(curve).with_strict_public_keys(true);
            roundtrip(&HybridCrypto::from_config(&config));
        }
    }

    #[test]
    fn test_long_message() {
        let crypto = HybridCrypto::default();
        let (a_private, a_public) = crypto.generate_keypair();
        let (b_private, b_public) = crypto.generate_keypair();
        let message = "Mensaje repetido. ".repeat(100);

        let sealed = crypto.encrypt(&a_private, &b_public, &message).unwrap();
        let opened = crypto
            .decrypt(&b_private, &a_public, &sealed.nonce, &sealed.ciphertext)
            .unwrap();
        assert_eq!(opened, message);
    }

    #[test]
    fn test_fresh_nonce_per_message() {
        let crypto = HybridCrypto::default();
        let (a_private, _) = crypto.generate_keypair();
        let (_, b_public) = crypto.generate_keypair();

        let first = crypto.encrypt(&a_private, &b_public, "same text").unwrap();
        let second = crypto.encrypt(&a_private, &b_public, "same text").unwrap();
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
    }

    #[test]
    fn test_encrypt_with_nonce_is_deterministic() {
        let crypto = HybridCrypto::default();
        let alice = KeyMaterial::from(
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a").unwrap(),
        );
        let bob_public = KeyMaterial::from(
            hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f").unwrap(),
        );
        let nonce = [1, 2, 3, 4, 5, 6, 7, 8];

        let first = crypto.encrypt_with_nonce(&alice, &bob_public, "hola", nonce).unwrap();
        let second = crypto.encrypt_with_nonce(&alice, &bob_public, "hola", nonce).unwrap();
        assert_eq!(first, second);

        // The key comes from the RFC 7748 shared secret through derive_key.
        let expected_key = kdf::derive_key_bytes(&kdf::SecretInput::from(
            "0x4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742",
        ))
        .unwrap();
        assert_eq!(*crypto.derive_key(&alice, &bob_public).unwrap(), expected_key);
        assert_eq!(
            first.ciphertext,
            aes::ctr::encrypt(b"hola", &expected_key, &nonce).unwrap()
        );
    }

    #[test]
    fn test_p256_key_derivation_uses_integer_hex() {
        let crypto = HybridCrypto::new("secp256r1").unwrap();
        let (a_private, _) = crypto.generate_keypair();
        let (_, b_public) = crypto.generate_keypair();

        let secret = crypto.shared_secret(&a_private, &b_public).unwrap();
        let SharedSecret::Integer(x) = &secret else {
            panic!("expected an integer secret");
        };
        let expected = kdf::derive_key_bytes(&kdf::SecretInput::from(format!("0x{x:x}"))).unwrap();
        assert_eq!(*crypto.derive_key(&a_private, &b_public).unwrap(), expected);
    }

    #[test]
    fn test_unsupported_curve() {
        for bad in ["ed25519", "", "SECP256R1", "p256"] {
            assert!(matches!(HybridCrypto::new(bad), Err(Error::Config(_))));
        }
    }

    #[test]
    fn test_x25519_key_shape_errors() {
        let crypto = HybridCrypto::new("25519").unwrap();
        let (private_key, public_key) = crypto.generate_keypair();

        let short = KeyMaterial::from(vec![1u8; 31]);
        let scalar = KeyMaterial::from(BigUint::from(5u32));

        assert!(matches!(crypto.encrypt(&short, &public_key, "x"), Err(Error::KeyShape(_))));
        assert!(matches!(crypto.encrypt(&private_key, &scalar, "x"), Err(Error::KeyShape(_))));
        assert!(matches!(
            crypto.decrypt(&private_key, &short, &[0u8; 8], b"x"),
            Err(Error::KeyShape(_))
        ));
    }

    #[test]
    fn test_p256_key_shape_errors() {
        let crypto = HybridCrypto::new("secp256r1").unwrap();
        let (private_key, public_key) = crypto.generate_keypair();
        let bytes = KeyMaterial::from([1u8; 32]);

        assert!(matches!(crypto.encrypt(&bytes, &public_key, "x"), Err(Error::KeyShape(_))));
        assert!(matches!(crypto.encrypt(&private_key, &bytes, "x"), Err(Error::KeyShape(_))));
        assert!(matches!(
            crypto.encrypt(&private_key, &private_key, "x"),
            Err(Error::KeyShape(_))
        ));
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let crypto = HybridCrypto::new("25519").unwrap();
        let (private_key, _) = crypto.generate_keypair();
        assert!(matches!(
            crypto.encrypt(&private_key, &KeyMaterial::from([0u8; 32]), "x"),
            Err(Error::InvalidPoint(_))
        ));

        let crypto = HybridCrypto::new("secp256r1").unwrap();
        let (_, public_key) = crypto.generate_keypair();
        assert_eq!(
            crypto
                .encrypt(&KeyMaterial::from(BigUint::from(0u32)), &public_key, "x")
                .unwrap_err(),
            Error::KeyRange
        );
        let identity = KeyMaterial::from((BigUint::from(0u32), BigUint::from(0u32)));
        let (private_key, _) = crypto.generate_keypair();
        assert!(matches!(
            crypto.encrypt(&private_key, &identity, "x"),
            Err(Error::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_strict_x25519_rejects_low_order_point() {
        // u = 1 has order 4 and yields an all-zero shared secret.
        let mut low_order = [0u8; 32];
        low_order[0] = 1;
        let private_key = KeyMaterial::from([0x11u8; 32]);
        let public_key = KeyMaterial::from(low_order);

        let lenient = HybridCrypto::new("25519").unwrap();
        assert!(lenient.shared_secret(&private_key, &public_key).is_ok());

        let strict =
            HybridCrypto::from_config(&HybridConfig::new(Curve::X25519).with_strict_public_keys(true));
        assert!(matches!(
            strict.shared_secret(&private_key, &public_key),
            Err(Error::InvalidPoint(_))
        ));
    }

    #[test]
    fn test_wrong_nonce_length() {
        let crypto = HybridCrypto::default();
        let (a_private, a_public) = crypto.generate_keypair();
        assert_eq!(
            crypto.decrypt(&a_private, &a_public, &[0u8; 12], b"data"),
            Err(Error::length("CTR nonce", 8, 12))
        );
    }

    #[test]
    fn test_wrong_key_does_not_recover_message() {
        let crypto = HybridCrypto::default();
        let (alice_private, _) = crypto.generate_keypair();
        let (bob_private, bob_public) = crypto.generate_keypair();
        let (_, eve_public) = crypto.generate_keypair();

        let message = "Mensaje secreto con acentos: canción, corazón";
        let sealed = crypto.encrypt(&alice_private, &bob_public, message).unwrap();

        match crypto.decrypt(&bob_private, &eve_public, &sealed.nonce, &sealed.ciphertext) {
            Ok(text) => assert_ne!(text, message),
            Err(err) => assert!(matches!(err, Error::Decode(_))),
        }
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let crypto = HybridCrypto::default();
        let (a_private, _) = crypto.generate_keypair();
        let (_, b_public) = crypto.generate_keypair();
        let nonce = [9u8; NONCE_SIZE];

        // Build a ciphertext that decrypts to 0xff 0xfe.
        let key = crypto.derive_key(&a_private, &b_public).unwrap();
        let ciphertext = aes::ctr::encrypt(&[0xff, 0xfe], key.as_slice(), &nonce).unwrap();

        assert!(matches!(
            crypto.decrypt(&a_private, &b_public, &nonce, &ciphertext),
            Err(Error::Decode(_))
        ));
    }
}
