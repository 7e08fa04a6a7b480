//! Dataset-wide evaluation driver
//!
//! Runs every problem through `max_pass_at_k` independent attempts.
//! Attempts share nothing but the worker semaphore; each one gets its own
//! scratch directory, so they may run concurrently across problems and
//! across repeated trials of the same problem.

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use tokio::sync::Semaphore;

use super::{EvalConfig, Evaluator};
use crate::dataset::{Dataset, Problem};
use crate::error::{EvalError, EvalResult};
use crate::metrics::{AttemptRecord, DatapointLog, FinalReport, ReportAggregator};
use crate::report::{DiagnosticKind, EvaluationReport};
use crate::sandbox::SandboxRunner;
use crate::synthesis::{CandidateProgram, Synthesizer};
use crate::toolchain::Toolchain;

/// Drives synthesize→evaluate attempts over a whole dataset
pub struct EvalExecutor {
    config: EvalConfig,
    synthesizer: Arc<dyn Synthesizer>,
    evaluator: Evaluator,
}

impl EvalExecutor {
    pub fn new(
        config: EvalConfig,
        synthesizer: Arc<dyn Synthesizer>,
        toolchain: Arc<dyn Toolchain>,
    ) -> Self {
        let runner = SandboxRunner::new().with_grace(config.kill_grace());
        let evaluator = Evaluator::new(toolchain)
            .with_runner(runner)
            .with_comparison(config.comparison);
        Self {
            config,
            synthesizer,
            evaluator,
        }
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run all attempts for all problems and fold the results
    pub async fn run(&self, dataset: &Dataset) -> EvalResult<FinalReport> {
        // Fail loudly before any attempt if the toolchain never probed
        // healthy; a missing compiler must not read as a 0% model.
        if let Err(reason) = self.evaluator.toolchain().availability() {
            return Err(EvalError::ToolchainUnavailable {
                language: self.evaluator.toolchain().language(),
                reason: reason.to_string(),
            });
        }

        let dataset = dataset.filter_by_tags(&self.config.tags);
        tracing::info!(
            problems = dataset.len(),
            attempts_per_problem = self.config.max_pass_at_k,
            workers = self.config.workers,
            "starting evaluation"
        );

        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.config.workers));

        let logs = join_all(
            dataset
                .iter()
                .map(|problem| self.run_problem(problem, semaphore.clone())),
        )
        .await
        .into_iter()
        .collect::<EvalResult<Vec<DatapointLog>>>()?;

        let total_time = started.elapsed().as_secs_f64();
        tracing::info!(total_time_secs = total_time, "evaluation finished");

        let aggregator = ReportAggregator::new(
            self.evaluator.toolchain().language(),
            self.synthesizer.name(),
            self.config.clone(),
        );
        Ok(aggregator.aggregate(logs, total_time))
    }

    /// Run one problem's attempt sequence
    async fn run_problem(
        &self,
        problem: &Problem,
        semaphore: Arc<Semaphore>,
    ) -> EvalResult<DatapointLog> {
        let mut attempts = Vec::with_capacity(self.config.max_pass_at_k as usize);

        if self.config.stop_on_success {
            for number in 1..=self.config.max_pass_at_k {
                let record = self.run_attempt(problem, number, &semaphore).await?;
                let success = record.success;
                attempts.push(record);
                if success {
                    break;
                }
            }
        } else {
            let futures = (1..=self.config.max_pass_at_k)
                .map(|number| self.run_attempt(problem, number, &semaphore));
            for result in join_all(futures).await {
                attempts.push(result?);
            }
        }

        Ok(DatapointLog::new(problem, attempts))
    }

    /// One independent synthesize→evaluate trial
    async fn run_attempt(
        &self,
        problem: &Problem,
        attempt_number: u32,
        semaphore: &Semaphore,
    ) -> EvalResult<AttemptRecord> {
        let _permit = semaphore
            .acquire()
            .await
            .expect("worker semaphore is never closed");

        let language = self.synthesizer.language();
        let synth_started = Instant::now();
        let candidate = match self.synthesizer.synthesize(problem).await {
            Ok(source) => CandidateProgram::new(source, language),
            Err(e) => {
                // A failed synthesis is an attempt with no usable candidate,
                // not an infrastructure fault.
                tracing::warn!(
                    src_uid = %problem.src_uid,
                    attempt = attempt_number,
                    error = %e,
                    "synthesis failed"
                );
                let synthesis_time = synth_started.elapsed().as_secs_f64();
                let mut report = EvaluationReport::new("");
                report.add_error(DiagnosticKind::Synthesizer, e.to_string());
                report.finalize();
                return Ok(AttemptRecord::new(
                    problem,
                    attempt_number,
                    CandidateProgram::new("", language),
                    report,
                    synthesis_time,
                    0.0,
                ));
            }
        };
        let synthesis_time = synth_started.elapsed().as_secs_f64();

        let eval_started = Instant::now();
        let report = self.evaluator.evaluate(problem, &candidate).await?;
        let evaluation_time = eval_started.elapsed().as_secs_f64();

        tracing::info!(
            src_uid = %problem.src_uid,
            attempt = attempt_number,
            status = %report.overall_status,
            tests = format!("{}/{}", report.passed_tests, report.total_tests),
            "attempt finished"
        );

        Ok(AttemptRecord::new(
            problem,
            attempt_number,
            candidate,
            report,
            synthesis_time,
            evaluation_time,
        ))
    }
}
