//! Toolchain adapters
//!
//! One adapter per target language, all behind the [`Toolchain`] trait:
//! build a candidate source (or run its dedicated parse check), hand back
//! the invocation the sandbox runner executes, and classify toolchain
//! output into the diagnostic taxonomy.
//!
//! Availability is probed exactly once, at adapter construction; the
//! resulting flag is immutable and consulted before every attempt. Whether
//! a candidate "compiles" is decided solely by the build/parse step here,
//! never inferred from execution-time failures.

mod ocaml;
mod python;
mod rules;
mod rust;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use ocaml::OcamlToolchain;
pub use python::PythonToolchain;
pub use rules::{DiagnosticPhase, RuleSet};
pub use rust::RustToolchain;

use crate::error::EvalError;
use crate::report::Diagnostic;
use crate::sandbox::{Invocation, SandboxRunner, Scratch};

/// Wall-clock bound for build / parse-check subprocesses
pub(crate) const BUILD_TIME_LIMIT: Duration = Duration::from_secs(60);

/// Wall-clock bound for the availability probe
const PROBE_TIME_LIMIT: Duration = Duration::from_secs(5);

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Python,
    Rust,
    Ocaml,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Ocaml => "ocaml",
        }
    }

    /// Source file name staged into the scratch directory
    pub fn source_file(&self) -> &'static str {
        match self {
            Language::Python => "main.py",
            Language::Rust => "main.rs",
            Language::Ocaml => "main.ml",
        }
    }

    pub fn all() -> &'static [Language] {
        &[Language::Python, Language::Rust, Language::Ocaml]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "rust" | "rs" => Ok(Language::Rust),
            "ocaml" | "ml" => Ok(Language::Ocaml),
            other => Err(EvalError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Result of building one candidate program
///
/// Build never fails with an error: every failure mode, including a refused
/// spawn, surfaces as `ok = false` plus classified diagnostics.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The dedicated build / parse check passed
    pub ok: bool,
    /// Invocation to execute per sample test; present iff `ok`
    pub artifact: Option<Invocation>,
    /// Classified build diagnostics (warnings on success)
    pub diagnostics: Vec<Diagnostic>,
    /// Raw standard error of the build step
    pub stderr: String,
}

impl BuildOutcome {
    pub fn success(artifact: Invocation, warnings: Vec<Diagnostic>, stderr: String) -> Self {
        Self {
            ok: true,
            artifact: Some(artifact),
            diagnostics: warnings,
            stderr,
        }
    }

    pub fn failure(diagnostics: Vec<Diagnostic>, stderr: String) -> Self {
        Self {
            ok: false,
            artifact: None,
            diagnostics,
            stderr,
        }
    }
}

/// Build / run / classify capability for one target language
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// Language this adapter handles
    fn language(&self) -> Language;

    /// Ordered classification tables for this toolchain's output
    fn rules(&self) -> &RuleSet;

    /// Construction-time probe result; `Err` carries the reason
    fn availability(&self) -> Result<(), &str>;

    /// Build the candidate inside `scratch`, returning the run invocation
    /// or classified diagnostics. Must not error for any source text.
    async fn build(&self, source: &str, scratch: &Scratch, runner: &SandboxRunner)
    -> BuildOutcome;

    /// Classify toolchain output from the given phase
    fn classify(&self, phase: DiagnosticPhase, output: &str) -> Vec<Diagnostic> {
        self.rules().classify(phase, output)
    }

    /// Convenience wrapper around [`availability`](Self::availability)
    fn is_available(&self) -> bool {
        self.availability().is_ok()
    }
}

/// Construct the adapter for a language, running its availability probe
pub async fn detect(language: Language) -> Arc<dyn Toolchain> {
    match language {
        Language::Python => Arc::new(PythonToolchain::detect().await),
        Language::Rust => Arc::new(RustToolchain::detect().await),
        Language::Ocaml => Arc::new(OcamlToolchain::detect().await),
    }
}

/// Probe that `program` answers a version query within a short deadline
pub(crate) async fn probe_version(program: &str, args: &[&str]) -> Result<(), String> {
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null());

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => return Err(format!("{} not found: {}", program, e)),
    };

    match tokio::time::timeout(PROBE_TIME_LIMIT, child.wait()).await {
        Ok(Ok(status)) if status.success() => Ok(()),
        Ok(Ok(status)) => Err(format!("{} probe exited with {}", program, status)),
        Ok(Err(e)) => Err(format!("{} probe failed: {}", program, e)),
        Err(_) => {
            let _ = child.kill().await;
            Err(format!("{} probe timed out", program))
        }
    }
}

/// Shared handling for a completed build step
pub(crate) fn finish_build(
    rules: &RuleSet,
    artifact: Invocation,
    outcome: crate::sandbox::RunOutcome,
) -> BuildOutcome {
    if outcome.timed_out {
        let diag = Diagnostic::new(
            crate::report::DiagnosticKind::Compile,
            format!(
                "build step timed out after {:.0}s",
                BUILD_TIME_LIMIT.as_secs_f64()
            ),
        );
        return BuildOutcome::failure(vec![diag], outcome.stderr);
    }
    if outcome.success() {
        let warnings = rules.matched_warnings(DiagnosticPhase::Build, &outcome.stderr);
        BuildOutcome::success(artifact, warnings, outcome.stderr)
    } else {
        let diagnostics = rules.classify(DiagnosticPhase::Build, &outcome.stderr);
        BuildOutcome::failure(diagnostics, outcome.stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_round_trip() {
        for lang in Language::all() {
            let parsed: Language = lang.as_str().parse().unwrap();
            assert_eq!(parsed, *lang);
        }
    }

    #[test]
    fn test_language_aliases() {
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("RS".parse::<Language>().unwrap(), Language::Rust);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[tokio::test]
    async fn test_probe_missing_binary() {
        let result = probe_version("definitely-not-a-real-binary", &["--version"]).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not found"));
    }

    #[tokio::test]
    async fn test_probe_present_binary() {
        // `sh` is part of the POSIX base; `-c true` exits zero everywhere.
        let result = probe_version("sh", &["-c", "true"]).await;
        assert!(result.is_ok());
    }
}
