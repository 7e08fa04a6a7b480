//! Candidate program synthesis
//!
//! The evaluation core is agnostic to where candidates come from; it only
//! sees a [`CandidateProgram`] per attempt. The [`Synthesizer`] trait is the
//! seam for pluggable producers. Network-backed model clients stay outside
//! this crate; the deterministic [`MockSynthesizer`] covers dry runs.

mod mock;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use mock::MockSynthesizer;

use crate::dataset::Problem;
use crate::toolchain::Language;

/// Errors from a candidate producer
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("synthesizer returned an empty response")]
    EmptyResponse,
    #[error("model request failed: {0}")]
    Request(String),
}

/// Opaque candidate source text tagged with its target language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProgram {
    pub source: String,
    pub language: Language,
}

impl CandidateProgram {
    pub fn new(source: impl Into<String>, language: Language) -> Self {
        Self {
            source: source.into(),
            language,
        }
    }

    /// No usable text at all
    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty()
    }
}

/// Produces one candidate program per attempt
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Short name recorded in the final report
    fn name(&self) -> &'static str;

    fn language(&self) -> Language;

    /// Produce candidate source for the problem
    async fn synthesize(&self, problem: &Problem) -> Result<String, SynthesisError>;
}

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+-]*)[ \t]*\n(.*?)```").expect("static code-fence pattern")
});

/// Extract candidate code from a model reply.
///
/// Prefers the last fenced block tagged with the target language, falls back
/// to the last fenced block of any tag, then to the whole reply.
pub fn extract_code_block(response: &str, language: Language) -> String {
    let mut last_any: Option<&str> = None;
    let mut last_tagged: Option<&str> = None;

    for captures in FENCED_BLOCK.captures_iter(response) {
        let tag = captures.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        last_any = Some(body);
        if tag.eq_ignore_ascii_case(language.as_str()) {
            last_tagged = Some(body);
        }
    }

    last_tagged
        .or(last_any)
        .unwrap_or(response)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_prefers_language_tagged_block() {
        let response = "Some prose.\n```text\nnot code\n```\nMore prose.\n```python\nprint(42)\n```\n";
        assert_eq!(extract_code_block(response, Language::Python), "print(42)");
    }

    #[test]
    fn test_extract_takes_last_tagged_block() {
        let response = "```python\nprint(1)\n```\n```python\nprint(2)\n```";
        assert_eq!(extract_code_block(response, Language::Python), "print(2)");
    }

    #[test]
    fn test_extract_falls_back_to_any_block() {
        let response = "```\nfn main() {}\n```";
        assert_eq!(extract_code_block(response, Language::Rust), "fn main() {}");
    }

    #[test]
    fn test_extract_falls_back_to_whole_response() {
        let response = "  print(7)\n";
        assert_eq!(extract_code_block(response, Language::Python), "print(7)");
    }

    #[test]
    fn test_candidate_emptiness() {
        assert!(CandidateProgram::new("  \n\t", Language::Python).is_empty());
        assert!(!CandidateProgram::new("print(1)", Language::Python).is_empty());
    }
}
