//! One reference problem
//!
//! Immutable for the lifetime of a run. The memory limit is informational
//! only; the sandbox enforces wall-clock time, not memory.

use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_time_limit() -> f64 {
    5.0
}

/// A reference problem with its published sample tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Unique problem id
    #[serde(default)]
    pub src_uid: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub input_from: String,
    #[serde(default)]
    pub output_to: String,

    /// Per-test wall-clock limit in seconds
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,

    /// Informational only, unenforced
    #[serde(default)]
    pub memory_limit: String,

    #[serde(default)]
    pub input_spec: String,
    #[serde(default)]
    pub output_spec: String,
    #[serde(default)]
    pub notes: String,

    /// Ordered sample inputs, paired with `sample_outputs` by index
    #[serde(default)]
    pub sample_inputs: Vec<String>,
    #[serde(default)]
    pub sample_outputs: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub difficulty: Option<u32>,
}

impl Problem {
    /// Ordered (input, expected output) sample pairs
    pub fn sample_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sample_inputs
            .iter()
            .map(String::as_str)
            .zip(self.sample_outputs.iter().map(String::as_str))
    }

    /// Per-test time limit as a duration
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit.max(0.0))
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Problem({}, difficulty={:?}, samples={})",
            self.src_uid,
            self.difficulty,
            self.sample_inputs.len()
        )
    }
}
