//! Attempt records and per-problem datapoint logs

use serde::{Deserialize, Serialize};

use crate::dataset::Problem;
use crate::report::EvaluationReport;
use crate::synthesis::CandidateProgram;

/// One synthesize+evaluate trial, immutable once created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Problem this attempt belongs to
    pub src_uid: String,
    /// 1-based index within the problem's attempt sequence
    pub attempt_number: u32,
    pub program: CandidateProgram,
    pub evaluation_report: EvaluationReport,
    /// Overall verdict was "success"
    pub success: bool,
    /// Seconds spent producing the candidate
    pub synthesis_time: f64,
    /// Seconds spent building and running it
    pub evaluation_time: f64,
}

impl AttemptRecord {
    pub fn new(
        problem: &Problem,
        attempt_number: u32,
        program: CandidateProgram,
        evaluation_report: EvaluationReport,
        synthesis_time: f64,
        evaluation_time: f64,
    ) -> Self {
        let success = evaluation_report.is_success();
        Self {
            src_uid: problem.src_uid.clone(),
            attempt_number,
            program,
            evaluation_report,
            success,
            synthesis_time,
            evaluation_time,
        }
    }
}

/// All attempts for one problem, in attempt order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatapointLog {
    pub src_uid: String,
    pub difficulty: Option<u32>,
    pub tags: Vec<String>,
    /// Ordered by `attempt_number`
    pub attempts: Vec<AttemptRecord>,
    /// Smallest attempt number that succeeded, `None` if none did
    pub passed_at_k: Option<u32>,
    /// Best per-attempt success rate seen
    pub best_success_rate: f64,
}

impl DatapointLog {
    /// Fold a problem's attempts into its log, deriving the summary fields
    pub fn new(problem: &Problem, mut attempts: Vec<AttemptRecord>) -> Self {
        attempts.sort_by_key(|a| a.attempt_number);

        let passed_at_k = attempts
            .iter()
            .find(|a| a.success)
            .map(|a| a.attempt_number);
        let best_success_rate = attempts
            .iter()
            .map(|a| a.evaluation_report.success_rate)
            .fold(0.0_f64, f64::max);

        Self {
            src_uid: problem.src_uid.clone(),
            difficulty: problem.difficulty,
            tags: problem.tags.clone(),
            attempts,
            passed_at_k,
            best_success_rate,
        }
    }

    /// Number of successful attempts
    pub fn success_count(&self) -> usize {
        self.attempts.iter().filter(|a| a.success).count()
    }
}
