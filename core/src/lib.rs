//! libzhconv-core
//!
//! Lexicon-driven Simplified/Traditional Chinese text conversion: segment-wise
//! dictionary substitution over Unicode text, driven by named conversion
//! configs ("s2t", "t2s", ...) in the shape OpenCC uses.
//!
//! Conversion is a chain of maximal-munch passes. Each pass scans the text
//! left to right, replaces the longest phrase its dictionaries know at the
//! current position, and copies unmapped code points through unchanged.
//! Dictionaries are loaded once into a process-wide cache and shared
//! read-only across concurrent conversions.
//!
//! Public API:
//! - `Lexicon` - phrase dictionary with longest-prefix lookup
//! - `Converter` - a resolved pipeline of dictionary passes
//! - `Registry` - maps config names to converters, caches loaded lexicons
//! - `TextConverter` - the trait host adapters (JNI/CLI/HTTP) depend on
//! - `ConvertError` - load/resolve/input error taxonomy
//! - `Config` - engine settings, TOML-serializable

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod config;
pub use config::{ChainStep, ConversionConfig, DictRef};

pub mod converter;
pub use converter::{Converter, TextConverter};

pub mod error;
pub use error::ConvertError;

pub mod lexicon;
pub use lexicon::{LexEntry, Lexicon};

pub mod registry;
pub use registry::Registry;

pub mod segment;

/// Engine settings.
///
/// Conversion *pipelines* are described by per-name JSON configs (see
/// `config`); this struct holds the host-level knobs that apply to every
/// conversion a registry performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory searched for conversion configs (`<name>.json`) and the
    /// dictionary files they reference.
    pub data_dir: PathBuf,

    /// NFC-normalize input text before the first pass. Off by default:
    /// dictionaries and inputs are normally already composed.
    pub normalize_input: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            normalize_input: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    /// NFC-normalize a string. No trimming: whitespace is text to a
    /// converter, not noise.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_toml_round_trip() {
        let config = Config {
            data_dir: PathBuf::from("/opt/zhconv/data"),
            normalize_input: true,
        };
        let raw = config.to_toml_string().unwrap();
        let back = Config::from_toml_str(&raw).unwrap();
        assert_eq!(back.data_dir, config.data_dir);
        assert!(back.normalize_input);
    }

    #[test]
    fn test_normalize_composes() {
        // "é" as base letter plus combining acute composes to a single
        // code point under NFC.
        let decomposed = "e\u{0301}";
        assert_eq!(utils::normalize(decomposed), "\u{00e9}");
    }
}
