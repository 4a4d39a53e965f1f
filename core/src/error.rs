//! Error taxonomy for lexicon loading, config resolution and conversion.
//!
//! All failures are detected eagerly, at load or resolve time, and surfaced
//! synchronously. The engine never retries a load (loading is deterministic,
//! so a malformed resource cannot succeed on retry) and never emits partial
//! or best-effort output on failure.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// A dictionary file referenced by a config is missing or unreadable.
    #[error("lexicon not found: {}: {source}", .path.display())]
    LexiconNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dictionary contents violate the well-formedness contract: an empty
    /// key, a duplicate key with a conflicting value, or an unparseable
    /// record.
    #[error("malformed lexicon {name}: {detail}")]
    MalformedLexicon { name: String, detail: String },

    /// A conversion config file could not be read or parsed.
    #[error("malformed config {name}: {reason}")]
    MalformedConfig { name: String, reason: String },

    /// The caller supplied a configuration name absent from the registry.
    #[error("unknown conversion config: {0}")]
    UnknownConfig(String),

    /// Input bytes are not well-formed UTF-8. Rejected before any conversion
    /// pass runs; the input is never silently truncated.
    #[error("input is not well-formed UTF-8: {0}")]
    InvalidInput(#[from] std::str::Utf8Error),
}
