//! Module with the pattern definition file reader.
//!
//! A pattern definition file is a JSON document listing pattern entries. Each entry carries the
//! major id, a display name, one or more regexes and optionally boundaries, an ignore flag and a
//! disabled flag. The loader expands every regex once per boundary (prefix and suffix are
//! concatenated around the regex), assigns minor ids 0 upward per expansion and drops disabled
//! entries.

use std::path::Path;

use serde::Deserialize;

use crate::{DescanError, DescanErrorKind, Pattern, PatternId, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternFile {
    patterns: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternEntry {
    id: u32,
    name: String,
    #[serde(default)]
    boundaries: Vec<Boundary>,
    regexes: Vec<String>,
    #[serde(default)]
    ignore: bool,
    #[serde(default)]
    disabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Boundary {
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    suffix: String,
}

/// Load pattern definitions from a file.
pub fn load_patterns<P: AsRef<Path>>(path: P) -> Result<Vec<Pattern>> {
    let content = std::fs::read_to_string(path)?;
    parse_patterns(&content)
}

/// Parse pattern definitions from a JSON document.
pub fn parse_patterns(json: &str) -> Result<Vec<Pattern>> {
    let file: PatternFile = serde_json::from_str(json)
        .map_err(|err| DescanError::new(DescanErrorKind::PatternFile(err.to_string())))?;
    let mut patterns = Vec::new();
    for entry in file.patterns {
        if entry.disabled {
            continue;
        }
        if entry.regexes.is_empty() {
            return Err(DescanError::new(DescanErrorKind::PatternFile(format!(
                "pattern {} '{}' has no regexes",
                entry.id, entry.name
            ))));
        }
        let mut minor = 0;
        let mut push = |regex: String, minor: &mut u32| {
            let mut pattern = Pattern::new(PatternId::new(entry.id, *minor), &entry.name, &regex);
            if entry.ignore {
                pattern = pattern.with_ignore();
            }
            patterns.push(pattern);
            *minor += 1;
        };
        if entry.boundaries.is_empty() {
            for regex in &entry.regexes {
                push(regex.clone(), &mut minor);
            }
        } else {
            for boundary in &entry.boundaries {
                for regex in &entry.regexes {
                    push(
                        format!("{}{}{}", boundary.prefix, regex, boundary.suffix),
                        &mut minor,
                    );
                }
            }
        }
    }
    Ok(patterns)
}
