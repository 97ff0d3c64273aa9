//! Error types for hybridcrypt.

use thiserror::Error;

/// Result type alias for hybridcrypt operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the cipher, key-agreement and derivation layers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unsupported curve selector or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Key, IV or other fixed-size input has the wrong length
    #[error("invalid length for {what}: expected {expected} bytes, got {actual}")]
    Length {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Ciphertext is not a whole number of blocks
    #[error("ciphertext length {actual} is not a multiple of {block} bytes")]
    Alignment { block: usize, actual: usize },

    /// Key does not have the representation the selected curve expects
    #[error("key shape mismatch: {0}")]
    KeyShape(String),

    /// Private scalar outside [1, n-1]
    #[error("private key out of range")]
    KeyRange,

    /// Public key is the identity, off the curve, outside the prime-order
    /// subgroup, or a rejected low-order value
    #[error("invalid public point: {0}")]
    InvalidPoint(String),

    /// Hex or UTF-8 decoding failed
    #[error("decode error: {0}")]
    Decode(String),

    /// HKDF was asked for more output than it can produce
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new key shape error
    pub fn key_shape(msg: impl Into<String>) -> Self {
        Error::KeyShape(msg.into())
    }

    /// Create a new invalid point error
    pub fn invalid_point(msg: impl Into<String>) -> Self {
        Error::InvalidPoint(msg.into())
    }

    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a new length error
    pub fn length(what: &'static str, expected: usize, actual: usize) -> Self {
        Error::Length {
            what,
            expected,
            actual,
        }
    }

    /// Check if this error reports a size problem (key/IV length, block alignment)
    pub fn is_length_error(&self) -> bool {
        matches!(self, Error::Length { .. } | Error::Alignment { .. })
    }

    /// Check if this error could have been triggered by a hostile peer rather
    /// than by a local configuration mistake
    pub fn is_adversarial_input(&self) -> bool {
        matches!(self, Error::InvalidPoint(_) | Error::Decode(_))
    }
}
