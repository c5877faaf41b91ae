use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a quiz hosted by the external quiz service.
///
/// Always trimmed and non-empty. The parser only produces hexadecimal ids,
/// but ids typed by hand (e.g. on the command line) are accepted verbatim.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizId(String);

impl QuizId {
    /// Creates a validated `QuizId`.
    ///
    /// # Errors
    ///
    /// Returns `ParseIdError` if the value is empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ParseIdError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                kind: "QuizId".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` characters of the id, used for fallback titles.
    #[must_use]
    pub fn prefix(&self, n: usize) -> &str {
        match self.0.char_indices().nth(n) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Debug for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizId({})", self.0)
    }
}

impl fmt::Display for QuizId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for QuizId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QuizId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuizId> for String {
    fn from(id: QuizId) -> Self {
        id.0
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an id from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for QuizId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_id_is_trimmed() {
        let id = QuizId::new("  abcdef0123456789abcd ").unwrap();
        assert_eq!(id.as_str(), "abcdef0123456789abcd");
        assert_eq!(id.to_string(), "abcdef0123456789abcd");
    }

    #[test]
    fn quiz_id_rejects_blank() {
        assert!(QuizId::new("   ").is_err());
        assert!("".parse::<QuizId>().is_err());
    }

    #[test]
    fn prefix_handles_short_ids() {
        let id = QuizId::new("abc").unwrap();
        assert_eq!(id.prefix(8), "abc");
        let id = QuizId::new("0123456789abcdef").unwrap();
        assert_eq!(id.prefix(8), "01234567");
    }
}
