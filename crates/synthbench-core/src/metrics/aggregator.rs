//! Final report assembly
//!
//! Folds all per-problem datapoint logs into one serializable record:
//! experiment configuration echo, summary and timing statistics, the
//! pass@k mapping, and the logs themselves.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DatapointLog, pass_at_k_summary};
use crate::error::{EvalError, EvalResult};
use crate::evaluator::EvalConfig;
use crate::toolchain::Language;

/// Headline counts and rates for a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_datapoints: usize,
    pub total_attempts: usize,
    pub successful_attempts: usize,
    /// Successful attempts over all attempts
    pub overall_success_rate: f64,
    /// Problems with at least one successful attempt, over all problems
    pub datapoint_success_rate: f64,
    pub total_evaluation_time: f64,
    pub average_time_per_datapoint: f64,
}

/// Where the wall-clock time went
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingStatistics {
    pub average_synthesis_time: f64,
    pub average_evaluation_time: f64,
    pub total_synthesis_time: f64,
    pub total_evaluation_time: f64,
}

/// Complete, serializable result of one evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub target_language: Language,
    pub synthesizer: String,
    pub config: EvalConfig,
    pub timestamp: DateTime<Utc>,
    pub summary_statistics: SummaryStatistics,
    pub pass_at_k_metrics: BTreeMap<String, f64>,
    pub timing_statistics: TimingStatistics,
    pub detailed_results: Vec<DatapointLog>,
}

impl FinalReport {
    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: impl AsRef<Path>) -> EvalResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| EvalError::Output {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote final report");
        Ok(())
    }
}

/// Builds a [`FinalReport`] out of datapoint logs
pub struct ReportAggregator {
    target_language: Language,
    synthesizer: String,
    config: EvalConfig,
}

impl ReportAggregator {
    pub fn new(
        target_language: Language,
        synthesizer: impl Into<String>,
        config: EvalConfig,
    ) -> Self {
        Self {
            target_language,
            synthesizer: synthesizer.into(),
            config,
        }
    }

    /// Fold the logs into the final report
    pub fn aggregate(&self, logs: Vec<DatapointLog>, total_time: f64) -> FinalReport {
        let pass_at_k_metrics = pass_at_k_summary(&logs, self.config.max_pass_at_k);

        let total_datapoints = logs.len();
        let total_attempts: usize = logs.iter().map(|log| log.attempts.len()).sum();
        let successful_attempts: usize = logs.iter().map(DatapointLog::success_count).sum();
        let datapoints_with_success = logs.iter().filter(|log| log.passed_at_k.is_some()).count();

        let summary_statistics = SummaryStatistics {
            total_datapoints,
            total_attempts,
            successful_attempts,
            overall_success_rate: ratio(successful_attempts, total_attempts),
            datapoint_success_rate: ratio(datapoints_with_success, total_datapoints),
            total_evaluation_time: total_time,
            average_time_per_datapoint: if total_datapoints > 0 {
                total_time / total_datapoints as f64
            } else {
                0.0
            },
        };

        let synthesis_times: Vec<f64> = logs
            .iter()
            .flat_map(|log| log.attempts.iter().map(|a| a.synthesis_time))
            .collect();
        let evaluation_times: Vec<f64> = logs
            .iter()
            .flat_map(|log| log.attempts.iter().map(|a| a.evaluation_time))
            .collect();

        let timing_statistics = TimingStatistics {
            average_synthesis_time: mean(&synthesis_times),
            average_evaluation_time: mean(&evaluation_times),
            total_synthesis_time: synthesis_times.iter().sum(),
            total_evaluation_time: evaluation_times.iter().sum(),
        };

        FinalReport {
            target_language: self.target_language,
            synthesizer: self.synthesizer.clone(),
            config: self.config.clone(),
            timestamp: Utc::now(),
            summary_statistics,
            pass_at_k_metrics,
            timing_statistics,
            detailed_results: logs,
        }
    }
}

/// Write one JSONL line per attempt, for downstream analysis tools
pub fn write_attempt_log(path: impl AsRef<Path>, report: &FinalReport) -> EvalResult<()> {
    use std::io::Write;

    let path = path.as_ref();
    let as_output_error = |source| EvalError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::create(path).map_err(as_output_error)?;
    let mut writer = std::io::BufWriter::new(file);

    for log in &report.detailed_results {
        for attempt in &log.attempts {
            let entry = serde_json::json!({
                "timestamp": report.timestamp,
                "datapoint": {
                    "src_uid": log.src_uid,
                    "difficulty": log.difficulty,
                    "tags": log.tags,
                },
                "attempt": {
                    "number": attempt.attempt_number,
                    "max_attempts": report.config.max_pass_at_k,
                },
                "synthesizer_config": {
                    "target_language": report.target_language,
                    "synthesizer": report.synthesizer,
                },
                "synthesized_program": attempt.program.source,
                "evaluation_report": attempt.evaluation_report,
                "timing": {
                    "synthesis_time": attempt.synthesis_time,
                    "evaluation_time": attempt.evaluation_time,
                    "total_time": attempt.synthesis_time + attempt.evaluation_time,
                },
                "success": attempt.success,
            });
            serde_json::to_writer(&mut writer, &entry)?;
            writer.write_all(b"\n").map_err(as_output_error)?;
        }
    }
    writer.flush().map_err(as_output_error)?;
    tracing::info!(path = %path.display(), "wrote attempt log");
    Ok(())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
