//! Orchestrator configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key agreement curve used by the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Curve {
    /// X25519 over Curve25519, selected by `"25519"`
    #[default]
    X25519,
    /// ECDH over NIST P-256, selected by `"secp256r1"`
    Secp256r1,
}

impl Curve {
    /// The selector string for this curve.
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::X25519 => "25519",
            Curve::Secp256r1 => "secp256r1",
        }
    }

    /// Every supported curve.
    pub fn all() -> [Curve; 2] {
        [Curve::X25519, Curve::Secp256r1]
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Curve {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "25519" => Ok(Curve::X25519),
            "secp256r1" => Ok(Curve::Secp256r1),
            other => Err(Error::config(format!(
                "unsupported curve {other:?}, expected \"25519\" or \"secp256r1\""
            ))),
        }
    }
}

impl TryFrom<String> for Curve {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Curve> for String {
    fn from(curve: Curve) -> Self {
        curve.as_str().to_string()
    }
}

/// Configuration for [`HybridCrypto`](super::HybridCrypto).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// Curve selector, `"25519"` or `"secp256r1"`
    pub curve: Curve,

    /// Run the full peer key checks before every key agreement: the subgroup
    /// check for P-256 and rejection of an all-zero X25519 result
    pub strict_public_keys: bool,
}

impl HybridConfig {
    /// Create a configuration for `curve` with default options.
    pub fn new(curve: Curve) -> Self {
        Self {
            curve,
            ..Self::default()
        }
    }

    /// Enable or disable strict peer key checks.
    pub fn with_strict_public_keys(mut self, strict: bool) -> Self {
        self.strict_public_keys = strict;
        self
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed JSON or an unsupported curve.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }
}
