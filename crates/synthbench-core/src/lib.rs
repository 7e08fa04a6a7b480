//! Synthbench evaluation core
//!
//! This crate scores machine-synthesized candidate programs against a
//! reference problem's published sample tests and aggregates repeated
//! independent attempts into unbiased pass@k metrics.
//!
//! # Features
//!
//! - **Sandboxed execution**: one exclusive scratch directory per attempt,
//!   process-group kills with a hard wall-clock bound
//! - **Toolchain adapters**: Python, Rust and OCaml behind one
//!   build/run/classify interface with ordered diagnostic rule tables
//! - **Structured verdicts**: per-attempt evaluation reports with a fixed
//!   error taxonomy
//! - **Pass@K metrics**: unbiased combinatorial estimation across attempts
//!
//! # Example
//!
//! ```rust,ignore
//! use synthbench_core::{Dataset, EvalConfig, EvalExecutor, MockSynthesizer, toolchain};
//!
//! let dataset = Dataset::load("problems.jsonl", None, 30)?;
//! let toolchain = toolchain::detect(Language::Python).await;
//! let synthesizer = Arc::new(MockSynthesizer::new(Language::Python));
//! let executor = EvalExecutor::new(EvalConfig::default(), synthesizer, toolchain);
//! let report = executor.run(&dataset).await?;
//! ```

pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod report;
pub mod sandbox;
pub mod synthesis;
pub mod toolchain;

// Re-exports for convenience
pub use dataset::{Dataset, Problem};
pub use error::{EvalError, EvalResult};
pub use evaluator::{EvalConfig, EvalExecutor, Evaluator, OutputComparison};
pub use metrics::{AttemptRecord, DatapointLog, FinalReport, estimate_pass_at_k};
pub use report::{EvaluationReport, OverallStatus, TestOutcome, TestStatus};
pub use sandbox::{Invocation, RunOutcome, SandboxRunner, Scratch};
pub use synthesis::{CandidateProgram, MockSynthesizer, Synthesizer};
pub use toolchain::{Language, Toolchain};
