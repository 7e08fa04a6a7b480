//! Rust toolchain adapter
//!
//! Compiled language: `rustc` produces a native binary in the scratch
//! directory, or diagnostics. Type rejections (E0308 and friends) are
//! distinguished from the rest of the compile taxonomy; panics at run time
//! are runtime faults.

use async_trait::async_trait;
use once_cell::sync::Lazy;

use super::rules::RuleSet;
use super::{BuildOutcome, Language, Toolchain, finish_build, probe_version};
use crate::report::{Diagnostic, DiagnosticKind};
use crate::sandbox::{Invocation, SandboxRunner, Scratch};

const COMPILER: &str = "rustc";
const BINARY: &str = "main";

static RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new(
        &[
            // Type system rejections first; the generic error rule would
            // otherwise shadow them.
            (
                r"^error\[E0(308|277|271|369|599|614)\]",
                DiagnosticKind::Type,
            ),
            (r"^error(\[E\d+\])?", DiagnosticKind::Compile),
            (r"^warning", DiagnosticKind::Warning),
        ],
        &[
            (r"panicked at", DiagnosticKind::Runtime),
            (r"attempt to .+ with overflow", DiagnosticKind::Runtime),
            (r"memory allocation of .+ failed", DiagnosticKind::Runtime),
            (r"stack overflow", DiagnosticKind::Runtime),
        ],
    )
});

/// Adapter for rustc-compiled candidates
pub struct RustToolchain {
    availability: Result<(), String>,
}

impl RustToolchain {
    /// Probe the compiler once and freeze the result
    pub async fn detect() -> Self {
        let availability = probe_version(COMPILER, &["--version"]).await;
        if let Err(reason) = &availability {
            tracing::warn!(%reason, "rust toolchain probe failed");
        }
        Self { availability }
    }
}

#[async_trait]
impl Toolchain for RustToolchain {
    fn language(&self) -> Language {
        Language::Rust
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
        let file = Language::Rust.source_file();
        if let Err(e) = scratch.write_file(file, source).await {
            let diag = Diagnostic::new(
                DiagnosticKind::Compile,
                format!("failed to stage source: {}", e),
            );
            return BuildOutcome::failure(vec![diag], String::new());
        }

        let compile = Invocation::new(COMPILER, scratch).args([
            "-O",
            "--edition",
            "2021",
            file,
            "-o",
            BINARY,
        ]);
        let outcome = runner.run(&compile, "", super::BUILD_TIME_LIMIT).await;

        let artifact = Invocation::new(scratch.join(BINARY).display().to_string(), scratch);
        finish_build(self.rules(), artifact, outcome)
    }
}
