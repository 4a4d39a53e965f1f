//! Conversion pipeline and the caller-facing conversion contract.

use std::sync::Arc;

use tracing::trace;

use crate::error::ConvertError;
use crate::lexicon::Lexicon;
use crate::segment;

/// Caller-facing conversion contract.
///
/// Host adapters (a JNI binding, a CLI, an HTTP handler) depend on this
/// trait rather than on the concrete registry, keeping resource loading and
/// process-lifecycle concerns on their side of the boundary.
pub trait TextConverter {
    /// Convert `input` using the named conversion config.
    fn convert(&self, input: &str, config: &str) -> Result<String, ConvertError>;

    /// Convert raw bytes, validating that they are well-formed UTF-8 first.
    ///
    /// Byte-oriented callers get the same contract C callers have: malformed
    /// input is rejected with `InvalidInput`, never truncated or mangled.
    fn convert_utf8(&self, input: &[u8], config: &str) -> Result<String, ConvertError> {
        let text = std::str::from_utf8(input)?;
        self.convert(text, config)
    }
}

/// One pass of a pipeline: a group of lexicons matched together.
#[derive(Debug)]
pub(crate) struct Pass {
    pub(crate) dicts: Vec<Arc<Lexicon>>,
}

/// A resolved conversion pipeline: an ordered list of dictionary passes.
///
/// Converters hold their lexicons behind `Arc` and never mutate them, so a
/// single converter can serve any number of concurrent `convert` calls.
#[derive(Debug)]
pub struct Converter {
    name: String,
    passes: Vec<Pass>,
    normalize_input: bool,
}

impl Converter {
    pub(crate) fn new(name: &str, passes: Vec<Pass>, normalize_input: bool) -> Self {
        Self {
            name: name.to_string(),
            passes,
            normalize_input,
        }
    }

    /// Build a pipeline directly from lexicons, one pass each.
    ///
    /// This is the programmatic route around config files, useful for tests
    /// and for hosts that assemble their own dictionaries.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use libzhconv_core::{Converter, Lexicon};
    ///
    /// let phrases = Arc::new(Lexicon::from_text("p", "简体\t簡體\n").unwrap());
    /// let chars = Arc::new(Lexicon::from_text("c", "汉\t漢\n").unwrap());
    /// let converter = Converter::from_lexicons("mini-s2t", vec![phrases, chars]);
    ///
    /// assert_eq!(converter.convert("简体汉字"), "簡體漢字");
    /// ```
    pub fn from_lexicons(name: &str, lexicons: Vec<Arc<Lexicon>>) -> Self {
        let passes = lexicons
            .into_iter()
            .map(|lex| Pass { dicts: vec![lex] })
            .collect();
        Self::new(name, passes, false)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of passes in the chain.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Run the pipeline: each pass's output feeds the next pass's input.
    pub fn convert(&self, input: &str) -> String {
        let mut text = if self.normalize_input {
            crate::utils::normalize(input)
        } else {
            input.to_string()
        };
        for pass in &self.passes {
            text = segment::apply_group(&pass.dicts, &text);
        }
        trace!(converter = %self.name, chars_in = input.chars().count(), "converted");
        text
    }
}
