//! Diagnostic taxonomy
//!
//! Every message produced by a toolchain, the sandbox or the synthesizer is
//! classified into exactly one kind; nothing is silently dropped.

use serde::{Deserialize, Serialize};

/// Kind of a classified diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No usable candidate text was produced
    Synthesizer,
    /// Rejected by the build/parse step before execution
    Compile,
    /// Rejected by the build step for a type mismatch
    Type,
    /// Crash or non-zero exit during a test run
    Runtime,
    /// Exceeded the problem's time limit
    Timeout,
    /// Non-fatal toolchain output
    Warning,
}

/// One classified message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
