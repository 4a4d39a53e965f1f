//! Config registry, name resolution and the process-wide lexicon cache.
//!
//! The registry maps conversion names ("s2t", "t2s", ...) to resolved
//! `Converter` pipelines. Configs come from `<name>.json` files in the data
//! directory or from programmatic registration. Every dictionary a config
//! references is loaded lazily into a process-wide cache keyed by canonical
//! file identity, populated once and never invalidated: dictionary files are
//! treated as immutable for the life of the process.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::config::{ConversionConfig, DictRef};
use crate::converter::{Converter, Pass, TextConverter};
use crate::error::ConvertError;
use crate::lexicon::Lexicon;
use crate::Config;

/// Process-wide lexicon cache. Replaces the implicit load-once semantics a
/// native-library host gets from its loader: explicit init-once,
/// teardown-never state shared by every registry in the process.
static LEXICON_CACHE: Lazy<RwLock<AHashMap<PathBuf, Arc<Lexicon>>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

/// Resolves conversion names to ready-to-use pipelines.
pub struct Registry {
    config: Config,
    /// Configs registered programmatically, by name.
    registered: RwLock<AHashMap<String, ConversionConfig>>,
    /// Resolved converters, by name.
    converters: RwLock<AHashMap<String, Arc<Converter>>>,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registered: RwLock::new(AHashMap::new()),
            converters: RwLock::new(AHashMap::new()),
        }
    }

    /// Registry over a data directory with default engine settings.
    pub fn with_data_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self::new(Config {
            data_dir: dir.into(),
            ..Config::default()
        })
    }

    /// Register a conversion config under `name` without a backing file.
    /// Replaces any previous registration and drops the cached converter for
    /// that name.
    pub fn register(&self, name: &str, conversion: ConversionConfig) {
        let key = canonical_name(name).to_string();
        if let Ok(mut converters) = self.converters.write() {
            converters.remove(&key);
        }
        if let Ok(mut registered) = self.registered.write() {
            registered.insert(key, conversion);
        }
    }

    /// Resolve `name` to a converter, loading and caching whatever the
    /// config references. `"s2t"` and `"s2t.json"` name the same config.
    pub fn resolve(&self, name: &str) -> Result<Arc<Converter>, ConvertError> {
        let key = canonical_name(name);
        if let Ok(converters) = self.converters.read() {
            if let Some(converter) = converters.get(key) {
                debug!(config = key, "converter cache hit");
                return Ok(Arc::clone(converter));
            }
        }

        let conversion = self.find_config(key)?;
        let converter = Arc::new(self.build_converter(key, &conversion)?);
        info!(
            config = key,
            passes = converter.pass_count(),
            "resolved conversion config"
        );

        if let Ok(mut converters) = self.converters.write() {
            return Ok(Arc::clone(
                converters.entry(key.to_string()).or_insert(converter),
            ));
        }
        Ok(converter)
    }

    /// Convert `input` using the named config. Equivalent to `resolve`
    /// followed by `Converter::convert`; no partial output is produced when
    /// resolution fails.
    pub fn convert(&self, input: &str, config: &str) -> Result<String, ConvertError> {
        let converter = self.resolve(config)?;
        Ok(converter.convert(input))
    }

    fn find_config(&self, key: &str) -> Result<ConversionConfig, ConvertError> {
        if let Ok(registered) = self.registered.read() {
            if let Some(conversion) = registered.get(key) {
                return Ok(conversion.clone());
            }
        }

        let path = self.config.data_dir.join(format!("{}.json", key));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConvertError::UnknownConfig(key.to_string()));
            }
            Err(e) => {
                return Err(ConvertError::MalformedConfig {
                    name: key.to_string(),
                    reason: e.to_string(),
                });
            }
        };
        ConversionConfig::from_json_str(&raw).map_err(|e| ConvertError::MalformedConfig {
            name: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn build_converter(
        &self,
        key: &str,
        conversion: &ConversionConfig,
    ) -> Result<Converter, ConvertError> {
        if conversion.conversion_chain.is_empty() {
            return Err(ConvertError::MalformedConfig {
                name: key.to_string(),
                reason: "empty conversion_chain".to_string(),
            });
        }
        let mut passes = Vec::with_capacity(conversion.conversion_chain.len());
        for step in &conversion.conversion_chain {
            let mut dicts = Vec::new();
            self.collect_dicts(&step.dict, &mut dicts)?;
            if dicts.is_empty() {
                return Err(ConvertError::MalformedConfig {
                    name: key.to_string(),
                    reason: "empty dictionary group".to_string(),
                });
            }
            passes.push(Pass { dicts });
        }
        Ok(Converter::new(key, passes, self.config.normalize_input))
    }

    fn collect_dicts(
        &self,
        dict: &DictRef,
        out: &mut Vec<Arc<Lexicon>>,
    ) -> Result<(), ConvertError> {
        match dict {
            DictRef::Text { file } => out.push(self.load_cached(file, false)?),
            DictRef::Compiled { file } => out.push(self.load_cached(file, true)?),
            DictRef::Group { dicts } => {
                for member in dicts {
                    self.collect_dicts(member, out)?;
                }
            }
        }
        Ok(())
    }

    fn load_cached(&self, file: &str, compiled: bool) -> Result<Arc<Lexicon>, ConvertError> {
        let path = self.config.data_dir.join(file);
        // Cache identity is the canonical path of a file actually on disk;
        // compiled references point at a stem, so canonicalize the fst half.
        let on_disk = if compiled {
            path.with_extension("fst")
        } else {
            path.clone()
        };
        let identity =
            std::fs::canonicalize(&on_disk).map_err(|e| ConvertError::LexiconNotFound {
                path: on_disk.clone(),
                source: e,
            })?;

        if let Ok(cache) = LEXICON_CACHE.read() {
            if let Some(lexicon) = cache.get(&identity) {
                debug!(lexicon = %identity.display(), "lexicon cache hit");
                return Ok(Arc::clone(lexicon));
            }
        }

        let loaded = Arc::new(if compiled {
            Lexicon::load_compiled(&path)?
        } else {
            Lexicon::load_text(&path)?
        });

        if let Ok(mut cache) = LEXICON_CACHE.write() {
            return Ok(Arc::clone(cache.entry(identity).or_insert(loaded)));
        }
        Ok(loaded)
    }
}

impl TextConverter for Registry {
    fn convert(&self, input: &str, config: &str) -> Result<String, ConvertError> {
        Registry::convert(self, input, config)
    }
}

fn canonical_name(name: &str) -> &str {
    name.strip_suffix(".json").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainStep;

    fn mini_config(file: &str) -> ConversionConfig {
        ConversionConfig {
            name: "mini".to_string(),
            conversion_chain: vec![ChainStep {
                dict: DictRef::Text {
                    file: file.to_string(),
                },
            }],
        }
    }

    #[test]
    fn test_unknown_config_name() {
        let registry = Registry::with_data_dir(std::env::temp_dir());
        let err = registry.convert("中文", "bogus").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownConfig(name) if name == "bogus"));
    }

    #[test]
    fn test_json_suffix_is_stripped() {
        assert_eq!(canonical_name("s2t.json"), "s2t");
        assert_eq!(canonical_name("s2t"), "s2t");
    }

    #[test]
    fn test_registered_config_with_missing_dict() {
        let registry = Registry::with_data_dir(std::env::temp_dir());
        registry.register("ghost", mini_config("does-not-exist.txt"));
        let err = registry.resolve("ghost").unwrap_err();
        assert!(matches!(err, ConvertError::LexiconNotFound { .. }));
    }

    #[test]
    fn test_empty_chain_is_malformed() {
        let registry = Registry::with_data_dir(std::env::temp_dir());
        registry.register(
            "empty",
            ConversionConfig {
                name: "empty".to_string(),
                conversion_chain: vec![],
            },
        );
        let err = registry.resolve("empty").unwrap_err();
        assert!(matches!(err, ConvertError::MalformedConfig { .. }));
    }
}
