//! Python toolchain adapter
//!
//! Interpreted language: there is no build artifact, so "compiles" means the
//! dedicated parse check (`python3 -m py_compile`) accepts the source. Type
//! errors in Python surface at run time and are classified as runtime
//! faults; only parse rejections count against `compiles`.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::rules::RuleSet;
use super::{BuildOutcome, Language, Toolchain, finish_build, probe_version};
use crate::report::{Diagnostic, DiagnosticKind};
use crate::sandbox::{Invocation, SandboxRunner, Scratch};

const INTERPRETER: &str = "python3";

static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        &[
            (r"SyntaxError", DiagnosticKind::Compile),
            (r"IndentationError|TabError", DiagnosticKind::Compile),
        ],
        &[
            (r"Traceback \(most recent call last\)", DiagnosticKind::Runtime),
            (
                r"^\s*(\w+\.)*\w*(Error|Exception|Interrupt|Exit): ",
                DiagnosticKind::Runtime,
            ),
            (r"RecursionError|MemoryError|KeyboardInterrupt", DiagnosticKind::Runtime),
            (r"\w+Warning:", DiagnosticKind::Warning),
        ],
    )
});

/// Adapter for CPython candidates
pub struct PythonToolchain {
    availability: Result<(), String>,
}

impl PythonToolchain {
    /// Probe the interpreter once and freeze the result
    pub async fn detect() -> Self {
        let availability = probe_version(INTERPRETER, &["--version"]).await;
        if let Err(reason) = &availability {
            tracing::warn!(%reason, "python toolchain probe failed");
        }
        Self { availability }
    }
}

#[async_trait]
impl Toolchain for PythonToolchain {
    fn language(&self) -> Language {
        Language::Python
    }

    fn rules(&self) -> &RuleSet {
        &RULES
    }

    fn availability(&self) -> Result<(), &str> {
        self.availability.as_ref().map(|_| ()).map_err(String::as_str)
    }

    async fn build(
        &self,
        source: &str,
        scratch: &Scratch,
        runner: &SandboxRunner,
    ) -> BuildOutcome {
        let file = Language::Python.source_file();
        if let Err(e) = scratch.write_file(file, source).await {
            let diag = Diagnostic::new(
                DiagnosticKind::Compile,
                format!("failed to stage source: {}", e),
            );
            return BuildOutcome::failure(vec![diag], String::new());
        }

        let check = Invocation::new(INTERPRETER, scratch).args(["-m", "py_compile", file]);
        let outcome = runner.run(&check, "", super::BUILD_TIME_LIMIT).await;

        let artifact = Invocation::new(INTERPRETER, scratch).arg(file);
        finish_build(self.rules(), artifact, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::DiagnosticPhase;

    // Recorded CPython output samples.
    const PARSE_REJECTION: &str = concat!(
        "  File \"main.py\", line 3\n",
        "    x = \n",
        "        ^\n",
        "SyntaxError: invalid syntax\n",
    );

    const RUNTIME_TRACEBACK: &str = concat!(
        "Traceback (most recent call last):\n",
        "  File \"main.py\", line 7, in <module>\n",
        "    print(undefined_var)\n",
        "NameError: name 'undefined_var' is not defined\n",
    );

    #[test]
    fn test_parse_rejection_classifies_as_compile() {
        let diags = RULES.classify(DiagnosticPhase::Build, PARSE_REJECTION);
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::Compile));
        assert!(diags.iter().any(|d| d.message.contains("SyntaxError")));
    }

    #[test]
    fn test_traceback_classifies_as_runtime() {
        let diags = RULES.classify(DiagnosticPhase::Run, RUNTIME_TRACEBACK);
        assert!(diags.iter().all(|d| d.kind == DiagnosticKind::Runtime));
        assert!(diags.iter().any(|d| d.message.contains("NameError")));
    }

    #[test]
    fn test_runtime_type_error_is_runtime_not_compile() {
        // A TypeError after a clean parse must not flip has_syntax_errors.
        let diags = RULES.classify(
            DiagnosticPhase::Run,
            "TypeError: unsupported operand type(s) for +: 'int' and 'str'",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Runtime);
    }

    #[test]
    fn test_deprecation_warning_is_warning() {
        let diags = RULES.matched_warnings(
            DiagnosticPhase::Run,
            "main.py:1: DeprecationWarning: the imp module is deprecated",
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Warning);
    }

    #[tokio::test]
    async fn test_build_accepts_valid_source_when_available() {
        let toolchain = PythonToolchain::detect().await;
        if !toolchain.is_available() {
            return;
        }
        let scratch = Scratch::new().unwrap();
        let runner = SandboxRunner::new();
        let outcome = toolchain.build("print(1 + 2)\n", &scratch, &runner).await;
        assert!(outcome.ok, "diagnostics: {:?}", outcome.diagnostics);
        assert!(outcome.artifact.is_some());
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_source_when_available() {
        let toolchain = PythonToolchain::detect().await;
        if !toolchain.is_available() {
            return;
        }
        let scratch = Scratch::new().unwrap();
        let runner = SandboxRunner::new();
        let outcome = toolchain.build("def broken(:\n    pass\n", &scratch, &runner).await;
        assert!(!outcome.ok);
        assert!(outcome.artifact.is_none());
        assert!(
            outcome
                .diagnostics
                .iter()
                .any(|d| d.kind == DiagnosticKind::Compile)
        );
    }
}
