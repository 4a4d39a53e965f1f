//! Phrase lexicon with longest-prefix lookup.
//!
//! A `Lexicon` maps source phrases to replacement phrases and answers one
//! question: "what is the longest key that is a prefix of the input at this
//! position?" Entries are bucketed by their first code point, and each bucket
//! keeps its entries sorted by descending key length, so the first hit during
//! a bucket scan is guaranteed to be the longest match.
//!
//! Two on-disk sources are supported:
//! - text dictionaries, one `key<TAB>value [value...]` record per line;
//! - compiled artifacts, an FST map (`<stem>.fst`, key -> index) paired with
//!   a bincode payload (`<stem>.bincode`, index -> replacement values).
//!
//! Lexicons are immutable once loaded and safe to share across threads.

use std::io::ErrorKind;
use std::path::Path;

use ahash::AHashMap;
use fst::{Map, MapBuilder, Streamer};
use tracing::debug;

use crate::error::ConvertError;

/// A parsed dictionary record: a source phrase and its replacement
/// candidates. Conversion always uses the first value; the rest are kept so
/// compiled artifacts can preserve the full source dictionary.
///
/// An empty `values` list stands for a single empty replacement (the entry
/// deletes its key from the output).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexEntry {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug)]
struct Entry {
    key: Box<[char]>,
    value: Box<str>,
}

/// Immutable phrase mapping indexed for longest-prefix lookup.
#[derive(Debug)]
pub struct Lexicon {
    name: String,
    /// Entries bucketed by first code point, longest key first. Length ties
    /// are ordered by key content so lookups never depend on hash ordering.
    buckets: AHashMap<char, Vec<Entry>>,
    len: usize,
}

/// Parse an OpenCC-style text dictionary.
///
/// One record per line: `key<TAB>value [value...]`. Blank lines are skipped.
/// A line without a tab separator, an empty key, or a duplicate key with
/// conflicting values is malformed. Exact duplicate records are collapsed.
pub fn parse_text(name: &str, src: &str) -> Result<Vec<LexEntry>, ConvertError> {
    let malformed = |line: usize, what: String| ConvertError::MalformedLexicon {
        name: name.to_string(),
        detail: format!("line {}: {}", line, what),
    };

    let mut entries: Vec<LexEntry> = Vec::new();
    let mut index: AHashMap<String, usize> = AHashMap::new();

    for (i, raw) in src.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let lineno = i + 1;
        let (key, rest) = line
            .split_once('\t')
            .ok_or_else(|| malformed(lineno, "missing tab separator".to_string()))?;
        if key.is_empty() {
            return Err(malformed(lineno, "empty key".to_string()));
        }

        // `key<TAB>` with nothing after the tab maps the key to the empty
        // string, i.e. the entry deletes its key.
        let mut values: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
        if values.is_empty() {
            values.push(String::new());
        }

        if let Some(&at) = index.get(key) {
            if entries[at].values != values {
                return Err(malformed(
                    lineno,
                    format!("duplicate key {:?} with conflicting value", key),
                ));
            }
            continue;
        }
        index.insert(key.to_string(), entries.len());
        entries.push(LexEntry {
            key: key.to_string(),
            values,
        });
    }

    Ok(entries)
}

/// Write parsed entries as a compiled artifact pair: `<stem>.fst` mapping
/// each key to an index, and `<stem>.bincode` holding the replacement values
/// per index. Every candidate value of the source dictionary is preserved,
/// so the artifact can reproduce its text source. `Lexicon::load_compiled`
/// reads the pair back.
pub fn write_compiled<P: AsRef<Path>>(
    entries: &[LexEntry],
    stem: P,
) -> Result<(), Box<dyn std::error::Error>> {
    let stem = stem.as_ref();

    // The fst builder requires keys in byte order.
    let mut sorted: Vec<&LexEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut builder = MapBuilder::new(Vec::new())?;
    let mut payloads: Vec<&Vec<String>> = Vec::with_capacity(sorted.len());
    for (i, entry) in sorted.iter().enumerate() {
        builder.insert(&entry.key, i as u64)?;
        payloads.push(&entry.values);
    }

    std::fs::write(stem.with_extension("fst"), builder.into_inner()?)?;
    std::fs::write(stem.with_extension("bincode"), bincode::serialize(&payloads)?)?;
    debug!(stem = %stem.display(), entries = payloads.len(), "wrote compiled lexicon");
    Ok(())
}

impl Lexicon {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            buckets: AHashMap::new(),
            len: 0,
        }
    }

    /// Build a lexicon from parsed entries. Only the first value of each
    /// entry is kept; the matcher never consults the alternatives.
    pub fn from_entries(name: &str, entries: Vec<LexEntry>) -> Result<Self, ConvertError> {
        let mut lex = Self::empty(name);
        for entry in entries {
            let value = entry.values.into_iter().next().unwrap_or_default();
            lex.insert(&entry.key, &value)?;
        }
        Ok(lex)
    }

    /// Parse a text dictionary from a string.
    ///
    /// # Example
    /// ```
    /// use libzhconv_core::Lexicon;
    ///
    /// let lex = Lexicon::from_text("demo", "汉\t漢\n汉字\t漢字\n").unwrap();
    /// let chars: Vec<char> = "汉字".chars().collect();
    ///
    /// let (len, replacement) = lex.lookup_longest(&chars, 0).unwrap();
    /// assert_eq!(len, 2);
    /// assert_eq!(replacement, "漢字");
    /// ```
    pub fn from_text(name: &str, src: &str) -> Result<Self, ConvertError> {
        let entries = parse_text(name, src)?;
        Self::from_entries(name, entries)
    }

    /// Load a text dictionary from a file. The lexicon is named after the
    /// file stem.
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("lexicon")
            .to_string();
        let src = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                ConvertError::MalformedLexicon {
                    name: name.clone(),
                    detail: "file is not valid UTF-8".to_string(),
                }
            } else {
                ConvertError::LexiconNotFound {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;
        let lex = Self::from_text(&name, &src)?;
        debug!(lexicon = %lex.name, entries = lex.len, "loaded text lexicon");
        Ok(lex)
    }

    /// Load a compiled artifact pair: `<stem>.fst` mapping keys to indices
    /// and `<stem>.bincode` holding the replacement values per index.
    pub fn load_compiled<P: AsRef<Path>>(stem: P) -> Result<Self, ConvertError> {
        let stem = stem.as_ref();
        let name = stem
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("lexicon")
            .to_string();

        let fst_path = stem.with_extension("fst");
        let fst_bytes = std::fs::read(&fst_path).map_err(|e| ConvertError::LexiconNotFound {
            path: fst_path.clone(),
            source: e,
        })?;
        let map = Map::new(fst_bytes).map_err(|e| ConvertError::MalformedLexicon {
            name: name.clone(),
            detail: format!("fst index: {}", e),
        })?;

        let payload_path = stem.with_extension("bincode");
        let payload_bytes =
            std::fs::read(&payload_path).map_err(|e| ConvertError::LexiconNotFound {
                path: payload_path.clone(),
                source: e,
            })?;
        let payloads: Vec<Vec<String>> =
            bincode::deserialize(&payload_bytes).map_err(|e| ConvertError::MalformedLexicon {
                name: name.clone(),
                detail: format!("payload: {}", e),
            })?;

        let mut lex = Self::empty(&name);
        let mut stream = map.stream();
        while let Some((key_bytes, idx)) = stream.next() {
            let key = std::str::from_utf8(key_bytes).map_err(|_| {
                ConvertError::MalformedLexicon {
                    name: name.clone(),
                    detail: "key is not valid UTF-8".to_string(),
                }
            })?;
            let values =
                payloads
                    .get(idx as usize)
                    .ok_or_else(|| ConvertError::MalformedLexicon {
                        name: name.clone(),
                        detail: format!("payload index {} out of range", idx),
                    })?;
            let value = values.first().map(String::as_str).unwrap_or("");
            lex.insert(key, value)?;
        }
        debug!(lexicon = %lex.name, entries = lex.len, "loaded compiled lexicon");
        Ok(lex)
    }

    /// Name of this lexicon, used in error messages and logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return the longest key that is a prefix of `text` starting at
    /// `start`, as `(match_length, replacement)`. Pure lookup; `None` when
    /// no key matches.
    pub fn lookup_longest(&self, text: &[char], start: usize) -> Option<(usize, &str)> {
        let first = *text.get(start)?;
        let bucket = self.buckets.get(&first)?;
        let remaining = text.len() - start;
        for entry in bucket {
            let klen = entry.key.len();
            if klen > remaining {
                continue;
            }
            if text[start..start + klen] == *entry.key {
                return Some((klen, &entry.value));
            }
        }
        None
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<(), ConvertError> {
        let key_chars: Box<[char]> = key.chars().collect();
        let first = match key_chars.first() {
            Some(&c) => c,
            None => {
                return Err(ConvertError::MalformedLexicon {
                    name: self.name.clone(),
                    detail: "empty key".to_string(),
                })
            }
        };

        let bucket = self.buckets.entry(first).or_default();
        // Bucket order: key length descending, then key ascending. The probe
        // comparator mirrors that order, so an exact hit is a duplicate key.
        let position = bucket.binary_search_by(|e| {
            key_chars
                .len()
                .cmp(&e.key.len())
                .then_with(|| e.key.as_ref().cmp(&*key_chars))
        });
        match position {
            Ok(at) => {
                if &*bucket[at].value != value {
                    return Err(ConvertError::MalformedLexicon {
                        name: self.name.clone(),
                        detail: format!("duplicate key {:?} with conflicting value", key),
                    });
                }
                Ok(())
            }
            Err(at) => {
                bucket.insert(
                    at,
                    Entry {
                        key: key_chars,
                        value: value.into(),
                    },
                );
                self.len += 1;
                Ok(())
            }
        }
    }
}
