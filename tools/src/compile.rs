use std::path::Path;

use anyhow::{Context, Result, anyhow};
use libzhconv_core::lexicon::{self, LexEntry};

/// Parse and validate a text dictionary. Validation is the engine's own
/// parser, so the rules here cannot drift from what the converter accepts.
fn parse(input: &Path) -> Result<Vec<LexEntry>> {
    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dict");
    let src = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    Ok(lexicon::parse_text(name, &src)?)
}

pub fn check(input: &Path) -> Result<usize> {
    Ok(parse(input)?.len())
}

pub fn run(input: &Path, out_stem: &Path) -> Result<usize> {
    let entries = parse(input)?;
    lexicon::write_compiled(&entries, out_stem)
        .map_err(|e| anyhow!("writing {}: {}", out_stem.display(), e))?;
    Ok(entries.len())
}
