//! Key Derivation Functions.
//!
//! HKDF (RFC 5869) with HMAC-SHA256, and the adapter that turns an ECDH
//! shared secret into a 16-byte AES key.

use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use num_traits::Zero;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Output size of HMAC-SHA256 in bytes.
pub const HASH_SIZE: usize = 32;

/// Largest output HKDF-SHA256 can produce.
pub const MAX_OUTPUT_LEN: usize = 255 * HASH_SIZE;

/// Context string bound into every derived AES key.
pub const DERIVATION_INFO: &[u8] = b"Derivacion de clave";

/// Length of the derived AES key in bytes.
pub const DERIVED_KEY_SIZE: usize = 16;

fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> [u8; HASH_SIZE] {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 takes keys of any size"),
    };
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// HKDF key derivation using SHA-256.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Hkdf {
    prk: [u8; HASH_SIZE],
}

impl Hkdf {
    /// Extract a pseudorandom key from input keying material.
    ///
    /// # Arguments
    ///
    /// * `salt` - Optional salt; 32 zero bytes when `None`
    /// * `ikm` - Input keying material (e.g., shared secret from DH)
    pub fn new(salt: Option<&[u8]>, ikm: &[u8]) -> Self {
        let salt = salt.unwrap_or(&[0u8; HASH_SIZE]);
        Self {
            prk: hmac_sha256(salt, &[ikm]),
        }
    }

    /// The extracted pseudorandom key.
    pub fn prk(&self) -> &[u8; HASH_SIZE] {
        &self.prk
    }

    /// Expand the PRK to produce output keying material.
    ///
    /// `T(i) = HMAC(PRK, T(i-1) || info || i)`, concatenated and truncated to `len`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyDerivation`] if `len` exceeds [`MAX_OUTPUT_LEN`].
    pub fn expand(&self, info: &[u8], len: usize) -> Result<Vec<u8>> {
        if len > MAX_OUTPUT_LEN {
            return Err(Error::KeyDerivation(format!(
                "requested {len} bytes, HKDF-SHA256 yields at most {MAX_OUTPUT_LEN}"
            )));
        }

        let mut okm = Vec::with_capacity(len);
        let mut previous: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::new());
        let mut counter = 1u8;
        while okm.len() < len {
            let block = hmac_sha256(&self.prk, &[previous.as_slice(), info, &[counter]]);
            let take = (len - okm.len()).min(HASH_SIZE);
            okm.extend_from_slice(&block[..take]);
            *previous = block.to_vec();
            counter = counter.wrapping_add(1);
        }
        Ok(okm)
    }

    /// Expand to a fixed-size array.
    pub fn expand_fixed<const N: usize>(&self, info: &[u8]) -> Result<[u8; N]> {
        let okm = Zeroizing::new(self.expand(info, N)?);
        let mut out = [0u8; N];
        out.copy_from_slice(&okm);
        Ok(out)
    }
}

/// A shared secret in one of the two forms the key agreement engines produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretInput {
    /// Hex digits, optionally `0x`-prefixed. Odd lengths get a leading zero.
    Hex(String),
    /// Unsigned integer, encoded big-endian with no leading zero bytes.
    Integer(BigUint),
}

impl SecretInput {
    /// Decode to the bytes fed into HKDF.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if a hex string contains non-hex characters.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            SecretInput::Hex(text) => {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                let decoded = if digits.len() % 2 == 0 {
                    hex::decode(digits)
                } else {
                    hex::decode(format!("0{digits}"))
                };
                decoded.map_err(|e| Error::decode(format!("invalid hex string: {e}")))
            }
            SecretInput::Integer(value) if value.is_zero() => Ok(Vec::new()),
            SecretInput::Integer(value) => Ok(value.to_bytes_be()),
        }
    }
}

impl From<&str> for SecretInput {
    fn from(text: &str) -> Self {
        SecretInput::Hex(text.to_owned())
    }
}

impl From<String> for SecretInput {
    fn from(text: String) -> Self {
        SecretInput::Hex(text)
    }
}

impl From<BigUint> for SecretInput {
    fn from(value: BigUint) -> Self {
        SecretInput::Integer(value)
    }
}

impl From<u64> for SecretInput {
    fn from(value: u64) -> Self {
        SecretInput::Integer(BigUint::from(value))
    }
}

/// Derive the 16-byte AES key for a shared secret.
///
/// HKDF-SHA256 with the default salt and [`DERIVATION_INFO`].
pub fn derive_key_bytes(secret: &SecretInput) -> Result<[u8; DERIVED_KEY_SIZE]> {
    let ikm = Zeroizing::new(secret.to_bytes()?);
    Hkdf::new(None, &ikm).expand_fixed(DERIVATION_INFO)
}

/// Derive the AES key for a shared secret as a `0x`-prefixed hex string.
pub fn derive_key(secret: &SecretInput) -> Result<String> {
    let mut key = derive_key_bytes(secret)?;
    let encoded = format!("0x{}", hex::encode(key));
    key.zeroize();
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unhex(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn test_rfc5869_case1() {
        let ikm = [0x0bu8; 22];
        let salt = unhex("000102030405060708090a0b0c");
        let info = unhex("f0f1f2f3f4f5f6f7f8f9");

        let hkdf = Hkdf::new(Some(&salt), &ikm);
        assert_eq!(
            hex::encode(hkdf.prk()),
            "077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5"
        );
        assert_eq!(
            hex::encode(hkdf.expand(&info, 42).unwrap()),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
    }

    #[test]
    fn test_matches_hkdf_crate() {
        let ikm = [0x42u8; 45];
        let info = b"cross-check";
        for len in [1usize, 16, 32, 33, 64, 100] {
            let ours = Hkdf::new(None, &ikm).expand(info, len).unwrap();

            let reference = hkdf::Hkdf::<Sha256>::new(None, &ikm);
            let mut okm = vec![0u8; len];
            reference.expand(info, &mut okm).unwrap();
            assert_eq!(ours, okm, "length {len}");
        }
    }

    #[test]
    fn test_default_salt_is_32_zero_bytes() {
        let ikm = b"shared";
        assert_eq!(
            Hkdf::new(None, ikm).prk(),
            Hkdf::new(Some(&[0u8; 32]), ikm).prk()
        );
    }

    #[test]
    fn test_expand_length_limit() {
        let hkdf = Hkdf::new(None, b"ikm");
        assert_eq!(hkdf.expand(b"", MAX_OUTPUT_LEN).unwrap().len(), MAX_OUTPUT_LEN);
        assert!(matches!(
            hkdf.expand(b"", MAX_OUTPUT_LEN + 1),
            Err(Error::KeyDerivation(_))
        ));
        assert!(hkdf.expand(b"", 0).unwrap().is_empty());
    }

    #[test]
    fn test_derive_key_format_and_determinism() {
        let secret = SecretInput::from("0x4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742");
        let key = derive_key(&secret).unwrap();
        assert!(key.starts_with("0x"));
        assert_eq!(key.len(), 2 + 2 * DERIVED_KEY_SIZE);
        assert_eq!(key, derive_key(&secret).unwrap());

        let bytes = derive_key_bytes(&secret).unwrap();
        assert_eq!(key, format!("0x{}", hex::encode(bytes)));
    }

    #[test]
    fn test_derive_key_matches_direct_hkdf() {
        let secret_bytes = unhex("00ff10");
        let expected = hkdf_reference(&secret_bytes);
        assert_eq!(derive_key_bytes(&SecretInput::from("00ff10")).unwrap(), expected);
    }

    fn hkdf_reference(ikm: &[u8]) -> [u8; 16] {
        let mut okm = [0u8; 16];
        hkdf::Hkdf::<Sha256>::new(Some(&[0u8; 32]), ikm)
            .expand(DERIVATION_INFO, &mut okm)
            .unwrap();
        okm
    }

    #[test]
    fn test_hex_prefix_and_odd_length() {
        let plain = derive_key(&SecretInput::from("abc")).unwrap();
        assert_eq!(plain, derive_key(&SecretInput::from("0x0abc")).unwrap());
        assert_eq!(plain, derive_key(&SecretInput::from("0abc")).unwrap());
        assert_eq!(SecretInput::from("0x123").to_bytes().unwrap(), vec![0x01, 0x23]);
    }

    #[test]
    fn test_integer_and_hex_forms_agree() {
        let value = BigUint::parse_bytes(b"0abc", 16).unwrap();
        assert_eq!(SecretInput::from(value.clone()).to_bytes().unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(
            derive_key(&SecretInput::from(value)).unwrap(),
            derive_key(&SecretInput::from("0xabc")).unwrap()
        );
    }

    #[test]
    fn test_integer_zero_is_empty_input() {
        assert!(SecretInput::from(0u64).to_bytes().unwrap().is_empty());
        assert_eq!(
            derive_key_bytes(&SecretInput::from(0u64)).unwrap(),
            hkdf_reference(&[])
        );
    }

    #[test]
    fn test_invalid_hex_is_decode_error() {
        for bad in ["0xzz", "hello", "12 34"] {
            assert!(matches!(
                derive_key(&SecretInput::from(bad)),
                Err(Error::Decode(_))
            ));
        }
    }
}
