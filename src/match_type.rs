use serde::{Deserialize, Serialize};

use crate::PatternId;

/// A match reported by the scanner.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The id of the matched pattern.
    id: PatternId,
    /// The display name of the matched pattern.
    name: String,
    /// The absolute character offset at which the matched text begins.
    pos: usize,
    /// The matched text.
    text: String,
}

impl Match {
    /// Create a new match.
    pub(crate) fn new(id: PatternId, name: &str, pos: usize, text: String) -> Self {
        Self {
            id,
            name: name.to_string(),
            pos,
            text,
        }
    }

    /// Get the pattern id of the match.
    #[inline]
    pub fn id(&self) -> PatternId {
        self.id
    }

    /// Get the pattern name of the match.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the absolute character offset at which the match begins.
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Get the matched text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the length of the match in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the match is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl std::fmt::Display for Match {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} '{}' at {}: '{}'",
            self.id,
            self.name,
            self.pos,
            self.text.escape_default()
        )
    }
}
