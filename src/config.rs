//! TOML configuration
//!
//! ```toml
//! key = "STEGANO"
//! width = 2
//! encrypt = true
//! random_order = true
//! debug = false
//! ```
//!
//! Every field is optional. Command-line flags take precedence.

use crate::error::Result;
use crate::stego::{embed, StegoError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Shared key; seeds the byte order and the cipher
    pub key: Option<String>,
    /// LSBs per carrier byte
    pub width: u8,
    /// Obfuscate the payload before embedding
    pub encrypt: bool,
    /// Visit carrier bytes in key-derived order when encoding; used as the
    /// first guess when decoding
    pub random_order: bool,
    /// Verbose decode diagnostics
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key: None,
            width: 1,
            encrypt: false,
            random_order: true,
            debug: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject settings no encode could succeed with
    pub fn validate(&self) -> std::result::Result<(), StegoError> {
        embed::validate_width(self.width)?;
        self.validate_key()
    }

    /// Decoding discovers the width on its own, so only the key matters
    pub fn validate_key(&self) -> std::result::Result<(), StegoError> {
        if self.key.as_deref() == Some("") {
            return Err(StegoError::EmptyKey);
        }
        Ok(())
    }
}
