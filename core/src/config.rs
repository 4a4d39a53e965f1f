//! Conversion config documents.
//!
//! A conversion config is a JSON file describing a named pipeline, in the
//! shape of OpenCC's s2t.json family:
//!
//! ```json
//! {
//!   "name": "Simplified Chinese to Traditional Chinese",
//!   "conversion_chain": [
//!     { "dict": { "type": "group", "dicts": [
//!       { "type": "text", "file": "STPhrases.txt" },
//!       { "type": "text", "file": "STCharacters.txt" }
//!     ] } }
//!   ]
//! }
//! ```
//!
//! Each chain step is one matcher pass; the steps run in order, each pass's
//! output feeding the next. Dictionary files are resolved relative to the
//! registry's data directory.

use serde::{Deserialize, Serialize};

/// A named, ordered sequence of dictionary passes. Immutable once resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    pub name: String,
    pub conversion_chain: Vec<ChainStep>,
}

/// One pass of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub dict: DictRef,
}

/// Reference to a dictionary source inside a config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DictRef {
    /// Plain text dictionary file.
    Text { file: String },
    /// Compiled artifact pair `<file>.fst` + `<file>.bincode`.
    Compiled { file: String },
    /// Several dictionaries matched together in one pass; on equal-length
    /// matches the earlier entry wins.
    Group { dicts: Vec<DictRef> },
}

impl ConversionConfig {
    /// Parse a config document from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize this config back to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_config() {
        let raw = r#"{
            "name": "Simplified Chinese to Traditional Chinese",
            "conversion_chain": [
                { "dict": { "type": "group", "dicts": [
                    { "type": "text", "file": "STPhrases.txt" },
                    { "type": "compiled", "file": "STCharacters" }
                ] } }
            ]
        }"#;
        let cfg = ConversionConfig::from_json_str(raw).unwrap();
        assert_eq!(cfg.conversion_chain.len(), 1);
        match &cfg.conversion_chain[0].dict {
            DictRef::Group { dicts } => {
                assert_eq!(dicts.len(), 2);
                assert!(matches!(dicts[0], DictRef::Text { .. }));
                assert!(matches!(dicts[1], DictRef::Compiled { .. }));
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = ConversionConfig {
            name: "t2s".to_string(),
            conversion_chain: vec![ChainStep {
                dict: DictRef::Text {
                    file: "TSCharacters.txt".to_string(),
                },
            }],
        };
        let raw = cfg.to_json_string().unwrap();
        let back = ConversionConfig::from_json_str(&raw).unwrap();
        assert_eq!(back.name, "t2s");
        assert!(matches!(
            back.conversion_chain[0].dict,
            DictRef::Text { ref file } if file == "TSCharacters.txt"
        ));
    }
}
