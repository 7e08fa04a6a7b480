//! Evaluation run configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::OutputComparison;

/// Configuration for an evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Attempts per problem; also the largest k reported
    #[serde(default = "default_max_pass_at_k")]
    pub max_pass_at_k: u32,

    /// Problems to load from the dataset
    #[serde(default = "default_samples")]
    pub samples: usize,

    /// Concurrent attempt limit
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Grace period between SIGTERM and SIGKILL at the deadline
    #[serde(default = "default_kill_grace_ms")]
    pub kill_grace_ms: u64,

    /// Output comparison policy
    #[serde(default)]
    pub comparison: OutputComparison,

    /// Stop a problem's attempt loop at the first success. Off by default:
    /// the estimator wants the same n for every problem.
    #[serde(default)]
    pub stop_on_success: bool,

    /// Drop problems above this difficulty
    #[serde(default)]
    pub difficulty_cutoff: Option<u32>,

    /// Keep only problems carrying one of these tags (empty = all)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Directory for the final report and attempt log
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_max_pass_at_k() -> u32 {
    5
}

fn default_samples() -> usize {
    30
}

fn default_workers() -> usize {
    4
}

fn default_kill_grace_ms() -> u64 {
    500
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_pass_at_k: default_max_pass_at_k(),
            samples: default_samples(),
            workers: default_workers(),
            kill_grace_ms: default_kill_grace_ms(),
            comparison: OutputComparison::default(),
            stop_on_success: false,
            difficulty_cutoff: None,
            tags: Vec::new(),
            output_dir: None,
        }
    }
}

impl EvalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_pass_at_k(mut self, k: u32) -> Self {
        self.max_pass_at_k = k.max(1);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_comparison(mut self, comparison: OutputComparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_stop_on_success(mut self, stop: bool) -> Self {
        self.stop_on_success = stop;
        self
    }

    pub fn with_difficulty_cutoff(mut self, cutoff: u32) -> Self {
        self.difficulty_cutoff = Some(cutoff);
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// SIGTERM→SIGKILL grace as a duration
    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}
