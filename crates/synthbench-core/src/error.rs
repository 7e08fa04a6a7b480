//! Error types for the evaluation pipeline
//!
//! Infrastructure faults live here. Program-quality faults (syntax errors,
//! crashes, timeouts, wrong output) are never errors: they are recorded
//! inside the [`EvaluationReport`](crate::report::EvaluationReport).

use std::path::PathBuf;

use crate::toolchain::Language;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Infrastructure faults, orthogonal to the quality of a candidate program.
///
/// An unavailable toolchain must surface here rather than score as 0%.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The external compiler/interpreter failed its availability probe
    #[error("{language} toolchain is unavailable: {reason}")]
    ToolchainUnavailable { language: Language, reason: String },

    /// Candidate was tagged for a different language than the toolchain
    #[error("candidate language {candidate} does not match toolchain language {toolchain}")]
    LanguageMismatch {
        candidate: Language,
        toolchain: Language,
    },

    /// Scratch directory could not be created
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    /// Dataset file could not be read
    #[error("failed to read dataset {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report or log file could not be written
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failure
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Name did not resolve to a supported target language
    #[error("unsupported target language: {0}")]
    UnknownLanguage(String),
}
