//! OCaml toolchain adapter
//!
//! Compiled language: `ocamlc` produces a bytecode executable in the
//! scratch directory. Type rejections carry their own kind; uncaught
//! exceptions at run time are runtime faults.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::rules::RuleSet;
use super::{BuildOutcome, Language, Toolchain, finish_build, probe_version};
use crate::report::{Diagnostic, DiagnosticKind};
use crate::sandbox::{Invocation, SandboxRunner, Scratch};

const COMPILER: &str = "ocamlc";
const BINARY: &str = "main";

static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        &[
            (r"Syntax error", DiagnosticKind::Compile),
            (
                r"This expression has type|has type .+ but an expression was expected",
                DiagnosticKind::Type,
            ),
            (
                r"Unbound (value|module|constructor|record field)",
                DiagnosticKind::Compile,
            ),
            (r"^Error", DiagnosticKind::Compile),
            (r"^Warning", DiagnosticKind::Warning),
        ],
        &[
            (r"Fatal error: exception", DiagnosticKind::Runtime),
            (r"Stack overflow", DiagnosticKind::Runtime),
            (r"Out of memory", DiagnosticKind::Runtime),
        ],
    )
});

/// Adapter for ocamlc-compiled candidates
pub struct OcamlToolchain {
    availability: Result<(), String>,
}

impl OcamlToolchain {
    /// Probe the compiler once and freeze the result
    pub async fn detect() -> Self {
        let availability = probe_version(COMPILER, &["-version"]).await;
        if let Err(reason) = &availability {
            tracing::warn!(%reason, "ocaml toolchain probe failed");
        }
        Self { availability }
    }
}

#[async_trait]
impl Toolchain for OcamlToolchain {
    fn language(&self) -> Language {
        Language::Ocaml
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
        let file = Language::Ocaml.source_file();
        if let Err(e) = scratch.write_file(file, source).await {
            let diag = Diagnostic::new(
                DiagnosticKind::Compile,
                format!("failed to stage source: {}", e),
            );
            return BuildOutcome::failure(vec![diag], String::new());
        }

        let compile = Invocation::new(COMPILER, scratch).args([file, "-o", BINARY]);
        let outcome = runner.run(&compile, "", super::BUILD_TIME_LIMIT).await;

        let artifact = Invocation::new(scratch.join(BINARY).display().to_string(), scratch);
        finish_build(self.rules(), artifact, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::DiagnosticPhase;

    // Recorded ocamlc output samples.
    const PARSE_REJECTION: &str = concat!(
        "File \"main.ml\", line 6, characters 2-15:\n",
        "6 |   print_endline undefined_var;\n",
        "Error: Syntax error\n",
    );

    const TYPE_REJECTION: &str = concat!(
        "File \"main.ml\", line 3, characters 17-18:\n",
        "Error: This expression has type int but an expression was expected of type\n",
        "         string\n",
    );

    const UNCAUGHT_EXCEPTION: &str =
        "Fatal error: exception Failure(\"nth\")\n";

    #[test]
    fn test_parse_rejection_classifies_as_compile() {
        let diags = RULES.classify(DiagnosticPhase::Build, PARSE_REJECTION);
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::Compile));
    }

    #[test]
    fn test_type_rejection_classifies_as_type() {
        let diags = RULES.classify(DiagnosticPhase::Build, TYPE_REJECTION);
        assert!(diags.iter().any(|d| d.kind == DiagnosticKind::Type));
    }

    #[test]
    fn test_uncaught_exception_classifies_as_runtime() {
        let diags = RULES.classify(DiagnosticPhase::Run, UNCAUGHT_EXCEPTION);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::Runtime);
    }

    #[tokio::test]
    async fn test_probe_sets_immutable_flag() {
        let toolchain = OcamlToolchain::detect().await;
        assert_eq!(toolchain.is_available(), toolchain.is_available());
    }
}
