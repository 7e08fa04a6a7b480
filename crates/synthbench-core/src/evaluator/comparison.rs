//! Output comparison policy
//!
//! How actual output is matched against the expected sample output is a
//! single explicit configuration choice, shared by every target language,
//! never a per-adapter special case.

use serde::{Deserialize, Serialize};

/// Normalization applied to both sides before an exact comparison
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputComparison {
    /// Byte-for-byte equality
    Exact,
    /// Exact match after trimming a single trailing newline (`\n` or
    /// `\r\n`) from each side. Programs conventionally end their output
    /// with one newline that sample expectations usually omit.
    #[default]
    TrimTrailingNewline,
    /// Exact match after trimming leading and trailing whitespace
    TrimWhitespace,
}

impl OutputComparison {
    /// Whether `actual` matches `expected` under this policy
    pub fn matches(&self, actual: &str, expected: &str) -> bool {
        match self {
            OutputComparison::Exact => actual == expected,
            OutputComparison::TrimTrailingNewline => {
                trim_one_newline(actual) == trim_one_newline(expected)
            }
            OutputComparison::TrimWhitespace => actual.trim() == expected.trim(),
        }
    }
}

fn trim_one_newline(s: &str) -> &str {
    let s = s.strip_suffix('\n').unwrap_or(s);
    s.strip_suffix('\r').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_trims_one_trailing_newline() {
        let policy = OutputComparison::default();
        assert!(policy.matches("6\n", "6"));
        assert!(policy.matches("6\r\n", "6"));
        assert!(policy.matches("6", "6\n"));
    }

    #[test]
    fn test_default_trims_only_one_newline() {
        let policy = OutputComparison::TrimTrailingNewline;
        assert!(!policy.matches("6\n\n", "6"));
        assert!(policy.matches("6\n\n", "6\n"));
    }

    #[test]
    fn test_default_preserves_internal_whitespace() {
        let policy = OutputComparison::TrimTrailingNewline;
        assert!(!policy.matches("1 2", "1  2"));
        assert!(policy.matches("a\nb\n", "a\nb"));
    }

    #[test]
    fn test_exact() {
        assert!(!OutputComparison::Exact.matches("6\n", "6"));
        assert!(OutputComparison::Exact.matches("6", "6"));
    }

    #[test]
    fn test_trim_whitespace() {
        assert!(OutputComparison::TrimWhitespace.matches("  6  \n", "6"));
        assert!(!OutputComparison::TrimWhitespace.matches("hello", "Hello"));
    }
}
