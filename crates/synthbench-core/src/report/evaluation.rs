//! Evaluation report for one candidate program
//!
//! Mirrors the stable record handed to the report/logging layer: always
//! fully populated, including on early-exit paths such as a build failure
//! (empty `test_results`, `compiles = false`).

use serde::{Deserialize, Serialize};

use super::{Diagnostic, DiagnosticKind};

/// Status of a single sample test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Clean run, output matched
    Passed,
    /// Clean run, wrong output
    Failed,
    /// The run itself failed (crash, timeout, spawn failure)
    Error,
}

/// Result of running the candidate against one sample pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub status: TestStatus,
    /// Detail for `Error` outcomes
    pub error: Option<String>,
}

/// Overall verdict on a candidate program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// `finalize()` has not run yet
    Unknown,
    /// Compiled cleanly and passed every sample test
    Success,
    /// Compiled cleanly, passed some but not all sample tests
    Partial,
    /// Did not compile, or passed nothing
    Failed,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OverallStatus::Unknown => "unknown",
            OverallStatus::Success => "success",
            OverallStatus::Partial => "partial",
            OverallStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Structured verdict for one evaluation attempt
///
/// Invariants:
/// - `total_tests = passed_tests + failed_tests` (an `Error` outcome counts
///   as failed);
/// - `success_rate = passed_tests / total_tests`, 0 when no test ran;
/// - `success_rate` and `overall_status` are written only by [`finalize`],
///   which is idempotent.
///
/// [`finalize`]: EvaluationReport::finalize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// The candidate source text under evaluation
    pub synthesized_program: String,

    /// A non-empty candidate was produced
    pub synthesized: bool,
    /// The dedicated build/parse check passed
    pub compiles: bool,
    /// Execution of sample tests was attempted
    pub executes: bool,

    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
    /// Outcomes in sample order
    pub test_results: Vec<TestOutcome>,

    /// Accumulated standard output across test runs
    pub stdout: String,
    /// Accumulated standard error across build and test runs
    pub stderr: String,

    pub synthesizer_errors: Vec<String>,
    pub compiler_errors: Vec<String>,
    pub runtime_errors: Vec<String>,
    pub warnings: Vec<String>,

    pub has_syntax_errors: bool,
    pub has_runtime_errors: bool,

    pub success_rate: f64,
    pub overall_status: OverallStatus,
}

impl EvaluationReport {
    /// Create a report for the given candidate source
    pub fn new(synthesized_program: impl Into<String>) -> Self {
        Self {
            synthesized_program: synthesized_program.into(),
            synthesized: false,
            compiles: false,
            executes: false,
            total_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            test_results: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
            synthesizer_errors: Vec::new(),
            compiler_errors: Vec::new(),
            runtime_errors: Vec::new(),
            warnings: Vec::new(),
            has_syntax_errors: false,
            has_runtime_errors: false,
            success_rate: 0.0,
            overall_status: OverallStatus::Unknown,
        }
    }

    /// Append one sample test outcome, keeping the counters consistent
    pub fn add_test_result(
        &mut self,
        input: impl Into<String>,
        expected_output: impl Into<String>,
        actual_output: impl Into<String>,
        status: TestStatus,
        error: Option<String>,
    ) {
        self.total_tests += 1;
        if status == TestStatus::Passed {
            self.passed_tests += 1;
        } else {
            self.failed_tests += 1;
        }
        self.test_results.push(TestOutcome {
            input: input.into(),
            expected_output: expected_output.into(),
            actual_output: actual_output.into(),
            status,
            error,
        });
    }

    /// Route a classified diagnostic into its bucket and update the flags
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        let Diagnostic { kind, message } = diagnostic;
        match kind {
            DiagnosticKind::Synthesizer => {
                self.synthesizer_errors.push(message);
                self.synthesized = false;
            }
            DiagnosticKind::Compile | DiagnosticKind::Type => {
                self.compiler_errors.push(message);
                self.has_syntax_errors = true;
            }
            DiagnosticKind::Runtime | DiagnosticKind::Timeout => {
                self.runtime_errors.push(message);
                self.has_runtime_errors = true;
            }
            DiagnosticKind::Warning => {
                self.warnings.push(message);
            }
        }
    }

    /// Convenience wrapper over [`add_diagnostic`](Self::add_diagnostic)
    pub fn add_error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.add_diagnostic(Diagnostic::new(kind, message));
    }

    /// Compute the derived fields.
    ///
    /// Sole writer of `success_rate` and `overall_status`; a pure function
    /// of `(compiles, has_syntax_errors, passed/total)`, so calling it
    /// again is a no-op.
    pub fn finalize(&mut self) {
        self.success_rate = if self.total_tests > 0 {
            self.passed_tests as f64 / self.total_tests as f64
        } else {
            0.0
        };

        self.overall_status = if !self.compiles || self.has_syntax_errors {
            OverallStatus::Failed
        } else if self.success_rate == 1.0 {
            OverallStatus::Success
        } else if self.success_rate > 0.0 {
            OverallStatus::Partial
        } else {
            OverallStatus::Failed
        };
    }

    /// Whether the attempt counts as a success for pass@k purposes
    pub fn is_success(&self) -> bool {
        self.overall_status == OverallStatus::Success
    }
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EvaluationReport(status={}, success_rate={:.2}, tests={}/{})",
            self.overall_status, self.success_rate, self.passed_tests, self.total_tests
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_report(passed: usize, failed: usize) -> EvaluationReport {
        let mut report = EvaluationReport::new("print(1)");
        report.synthesized = true;
        report.compiles = true;
        report.executes = true;
        for i in 0..passed {
            report.add_test_result(format!("in{}", i), "1", "1", TestStatus::Passed, None);
        }
        for i in 0..failed {
            report.add_test_result(format!("in{}", i), "1", "2", TestStatus::Failed, None);
        }
        report
    }

    #[test]
    fn test_counters_stay_consistent() {
        let report = passing_report(3, 2);
        assert_eq!(report.total_tests, 5);
        assert_eq!(report.passed_tests + report.failed_tests, report.total_tests);
    }

    #[test]
    fn test_error_outcome_counts_as_failed() {
        let mut report = passing_report(1, 0);
        report.add_test_result("x", "1", "", TestStatus::Error, Some("boom".into()));
        assert_eq!(report.total_tests, 2);
        assert_eq!(report.failed_tests, 1);
    }

    #[test]
    fn test_finalize_success() {
        let mut report = passing_report(2, 0);
        report.finalize();
        assert_eq!(report.success_rate, 1.0);
        assert_eq!(report.overall_status, OverallStatus::Success);
    }

    #[test]
    fn test_finalize_partial() {
        let mut report = passing_report(1, 1);
        report.finalize();
        assert_eq!(report.success_rate, 0.5);
        assert_eq!(report.overall_status, OverallStatus::Partial);
    }

    #[test]
    fn test_finalize_all_wrong_is_failed() {
        let mut report = passing_report(0, 3);
        report.finalize();
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_finalize_no_compile_is_failed() {
        let mut report = EvaluationReport::new("fn main( {}");
        report.synthesized = true;
        report.add_error(DiagnosticKind::Compile, "error: mismatched delimiter");
        report.finalize();
        assert!(!report.compiles);
        assert!(report.has_syntax_errors);
        assert_eq!(report.total_tests, 0);
        assert_eq!(report.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_finalize_zero_tests_rate_is_zero() {
        let mut report = EvaluationReport::new("");
        report.compiles = true;
        report.finalize();
        assert_eq!(report.success_rate, 0.0);
        assert_eq!(report.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut report = passing_report(1, 2);
        report.add_error(DiagnosticKind::Runtime, "panic");
        report.finalize();
        let first = (report.success_rate, report.overall_status);
        report.finalize();
        report.finalize();
        assert_eq!((report.success_rate, report.overall_status), first);
    }

    #[test]
    fn test_diagnostic_routing() {
        let mut report = EvaluationReport::new("x");
        report.synthesized = true;
        report.add_error(DiagnosticKind::Type, "expected i32, found &str");
        report.add_error(DiagnosticKind::Timeout, "test 1 timed out after 2.0s");
        report.add_error(DiagnosticKind::Warning, "unused variable");
        assert_eq!(report.compiler_errors.len(), 1);
        assert_eq!(report.runtime_errors.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.has_syntax_errors);
        assert!(report.has_runtime_errors);
    }

    #[test]
    fn test_synthesizer_error_clears_synthesized() {
        let mut report = EvaluationReport::new("");
        report.synthesized = true;
        report.add_error(DiagnosticKind::Synthesizer, "empty candidate");
        assert!(!report.synthesized);
        report.finalize();
        assert_eq!(report.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut report = passing_report(1, 0);
        report.finalize();
        let json = serde_json::to_string(&report).unwrap();
        let back: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.overall_status, OverallStatus::Success);
        assert_eq!(back.test_results.len(), 1);
    }
}
