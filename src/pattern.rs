//! Module with the pattern types and their methods.
use serde::{Deserialize, Serialize};

/// The identifier of a pattern: a (major, minor) pair.
///
/// The major component comes from the pattern definition; the minor component disambiguates the
/// boundary/regex expansions of a single definition and is assigned by the loader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatternId {
    major: u32,
    minor: u32,
}

impl PatternId {
    /// Create a new pattern id.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Get the major component.
    #[inline]
    pub fn major(&self) -> u32 {
        self.major
    }

    /// Get the minor component.
    #[inline]
    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A pattern that is searched for in the input.
///
/// A pattern couples an identifier and a display name with the source text of a regular
/// expression. Patterns with the `ignore` flag still take part in matching, but their matches
/// are silently consumed instead of reported; this masks longer well-formed inputs that a
/// shorter-matching pattern would otherwise report.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    id: PatternId,
    name: String,
    regex: String,
    ignore: bool,
}

impl Pattern {
    /// Create a new pattern.
    pub fn new(id: PatternId, name: &str, regex: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            regex: regex.to_string(),
            ignore: false,
        }
    }

    /// Mark the pattern as an ignore pattern.
    pub fn with_ignore(self) -> Self {
        Self {
            ignore: true,
            ..self
        }
    }

    /// Get the pattern id.
    #[inline]
    pub fn id(&self) -> PatternId {
        self.id
    }

    /// Get the display name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the source regex.
    #[inline]
    pub fn regex(&self) -> &str {
        &self.regex
    }

    /// Check if the pattern is an ignore pattern.
    #[inline]
    pub fn is_ignore(&self) -> bool {
        self.ignore
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' /{}/",
            self.id,
            self.name,
            self.regex.escape_default()
        )?;
        if self.ignore {
            write!(f, " (ignore)")?;
        }
        Ok(())
    }
}
