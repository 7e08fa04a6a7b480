//! Evaluation orchestration
//!
//! [`Evaluator`] scores one (problem, candidate) pair; [`EvalExecutor`]
//! drives a whole dataset of problems through repeated independent attempts.

mod comparison;
mod config;
mod executor;

use std::sync::Arc;

pub use comparison::OutputComparison;
pub use config::EvalConfig;
pub use executor::EvalExecutor;

use crate::error::{EvalError, EvalResult};
use crate::dataset::Problem;
use crate::report::{DiagnosticKind, EvaluationReport, TestStatus};
use crate::sandbox::{SandboxRunner, Scratch};
use crate::synthesis::CandidateProgram;
use crate::toolchain::{DiagnosticPhase, Toolchain};

/// Scores one candidate program against one problem's sample tests
///
/// `evaluate` is total over candidate text: syntax errors, crashes,
/// timeouts and wrong output all land inside the returned report. Only
/// infrastructure faults (unavailable toolchain, scratch I/O) surface as
/// errors.
pub struct Evaluator {
    toolchain: Arc<dyn Toolchain>,
    runner: SandboxRunner,
    comparison: OutputComparison,
}

impl Evaluator {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            toolchain,
            runner: SandboxRunner::new(),
            comparison: OutputComparison::default(),
        }
    }

    pub fn with_runner(mut self, runner: SandboxRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_comparison(mut self, comparison: OutputComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn toolchain(&self) -> &Arc<dyn Toolchain> {
        &self.toolchain
    }

    /// Evaluate one candidate against the problem's sample tests
    pub async fn evaluate(
        &self,
        problem: &Problem,
        candidate: &CandidateProgram,
    ) -> EvalResult<EvaluationReport> {
        // Infrastructure faults are checked up front so an unavailable
        // toolchain can never score a candidate as 0%.
        if let Err(reason) = self.toolchain.availability() {
            return Err(EvalError::ToolchainUnavailable {
                language: self.toolchain.language(),
                reason: reason.to_string(),
            });
        }
        if candidate.language != self.toolchain.language() {
            return Err(EvalError::LanguageMismatch {
                candidate: candidate.language,
                toolchain: self.toolchain.language(),
            });
        }

        let mut report = EvaluationReport::new(&candidate.source);

        if candidate.is_empty() {
            report.add_error(
                DiagnosticKind::Synthesizer,
                "synthesizer produced no candidate program",
            );
            report.finalize();
            return Ok(report);
        }
        report.synthesized = true;

        let scratch = Scratch::new()?;

        let built = self
            .toolchain
            .build(&candidate.source, &scratch, &self.runner)
            .await;
        report.compiles = built.ok;
        report.stderr.push_str(&built.stderr);
        for diagnostic in built.diagnostics {
            report.add_diagnostic(diagnostic);
        }

        let artifact = match built.artifact {
            Some(artifact) if built.ok => artifact,
            _ => {
                tracing::debug!(src_uid = %problem.src_uid, "candidate rejected at build step");
                report.finalize();
                return Ok(report);
            }
        };

        report.executes = true;
        let time_limit = problem.time_limit();

        // Every sample is attempted independently; a failure on one never
        // skips the next.
        for (index, (input, expected)) in problem.sample_pairs().enumerate() {
            let outcome = self.runner.run(&artifact, input, time_limit).await;
            tracing::debug!(
                src_uid = %problem.src_uid,
                test = index + 1,
                exit = ?outcome.exit_code,
                timed_out = outcome.timed_out,
                wall_ms = outcome.wall_time.as_millis() as u64,
                "sample test finished"
            );

            report.stdout.push_str(&outcome.stdout);
            report.stderr.push_str(&outcome.stderr);

            let (status, error) = if outcome.timed_out {
                let message = format!(
                    "test {} timed out after {:.1}s",
                    index + 1,
                    problem.time_limit
                );
                report.add_error(DiagnosticKind::Timeout, &message);
                (TestStatus::Error, Some(message))
            } else if !outcome.started {
                let message = outcome.stderr.trim().to_string();
                report.add_error(DiagnosticKind::Runtime, &message);
                (TestStatus::Error, Some(message))
            } else if outcome.exit_code != Some(0) {
                for diagnostic in self.toolchain.classify(DiagnosticPhase::Run, &outcome.stderr) {
                    report.add_diagnostic(diagnostic);
                }
                let detail = outcome
                    .stderr
                    .lines()
                    .find(|line| !line.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| match outcome.exit_code {
                        Some(code) => format!("process exited with status {}", code),
                        None => "process was terminated by a signal".to_string(),
                    });
                (TestStatus::Error, Some(detail))
            } else {
                for warning in self
                    .toolchain
                    .rules()
                    .matched_warnings(DiagnosticPhase::Run, &outcome.stderr)
                {
                    report.add_diagnostic(warning);
                }
                if self.comparison.matches(&outcome.stdout, expected) {
                    (TestStatus::Passed, None)
                } else {
                    (TestStatus::Failed, None)
                }
            };

            report.add_test_result(input, expected, outcome.stdout.clone(), status, error);
        }

        report.finalize();
        Ok(report)
    }
}
