//! Synthbench CLI
//!
//! Evaluates synthesized candidate programs against a problem dataset and
//! reports pass@k metrics.
//!
//! ```bash
//! synthbench --target-language python --dataset data/problems.jsonl \
//!     --max-pass-at-k 5 --samples 10
//! ```
//!
//! Candidates come from the built-in deterministic dry-run synthesizer;
//! model-backed synthesizers plug in through the `Synthesizer` trait of
//! `synthbench-core`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;

use synthbench_core::metrics::write_attempt_log;
use synthbench_core::{
    Dataset, EvalConfig, EvalExecutor, FinalReport, Language, MockSynthesizer, Synthesizer,
    toolchain,
};

#[derive(Debug, Parser)]
#[command(name = "synthbench", version, about = "Evaluate synthesized programs with pass@k metrics")]
struct Cli {
    /// Target programming language
    #[arg(short = 'l', long)]
    target_language: Language,

    /// Path to the JSONL problem dataset
    #[arg(short = 'd', long, default_value = "data/problems.jsonl")]
    dataset: PathBuf,

    /// Attempts per problem; also the largest reported k
    #[arg(short = 'k', long, default_value_t = 5)]
    max_pass_at_k: u32,

    /// Number of problems to evaluate
    #[arg(short = 's', long, default_value_t = 30)]
    samples: usize,

    /// Concurrent attempt limit
    #[arg(short = 'w', long, default_value_t = 4)]
    workers: usize,

    /// Drop problems above this difficulty
    #[arg(long)]
    difficulty_cutoff: Option<u32>,

    /// Keep only problems carrying one of these tags
    #[arg(long)]
    tag: Vec<String>,

    /// Stop a problem's attempt loop at the first success
    #[arg(long)]
    stop_on_success: bool,

    /// Directory for the final report and attempt log
    #[arg(short = 'o', long, default_value = "reports")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug for verbose logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let dataset = Dataset::load(&cli.dataset, cli.difficulty_cutoff, cli.samples)
        .context("failed to load problem dataset")?;
    if dataset.is_empty() {
        bail!("dataset {} contains no usable problems", cli.dataset.display());
    }

    let toolchain = toolchain::detect(cli.target_language).await;
    if let Err(reason) = toolchain.availability() {
        bail!(
            "{} toolchain is unavailable: {} (install it or pick another --target-language)",
            cli.target_language,
            reason
        );
    }

    let config = EvalConfig::new()
        .with_max_pass_at_k(cli.max_pass_at_k)
        .with_samples(cli.samples)
        .with_workers(cli.workers)
        .with_stop_on_success(cli.stop_on_success)
        .with_output_dir(&cli.output_dir);
    let config = EvalConfig {
        tags: cli.tag.clone(),
        difficulty_cutoff: cli.difficulty_cutoff,
        ..config
    };

    let synthesizer = Arc::new(MockSynthesizer::new(cli.target_language));
    let executor = EvalExecutor::new(config, synthesizer.clone(), toolchain);

    println!(
        "Evaluating {} problems, {} attempts each ({} workers)...",
        dataset.len(),
        cli.max_pass_at_k,
        cli.workers
    );

    let report = executor.run(&dataset).await?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("failed to create {}", cli.output_dir.display()))?;

    let report_path = cli.output_dir.join(format!(
        "final_report_{}_{}.json",
        cli.target_language,
        synthesizer.name()
    ));
    report.write_json(&report_path)?;

    let log_path = cli.output_dir.join(format!(
        "{}_{}.jsonl",
        cli.target_language,
        synthesizer.name()
    ));
    write_attempt_log(&log_path, &report)?;

    print_summary(&report);
    println!("\nFinal report: {}", report_path.display());
    println!("Attempt log:  {}", log_path.display());

    Ok(())
}

fn print_summary(report: &FinalReport) {
    let summary = &report.summary_statistics;

    println!("\n{:=<60}", "");
    println!("EVALUATION SUMMARY");
    println!("{:=<60}", "");
    println!("Target Language:   {}", report.target_language);
    println!("Synthesizer:       {}", report.synthesizer);
    println!("Total Datapoints:  {}", summary.total_datapoints);
    println!("Total Attempts:    {}", summary.total_attempts);
    println!("Successful:        {}", summary.successful_attempts);
    println!(
        "Attempt Success:   {:.2}%",
        summary.overall_success_rate * 100.0
    );
    println!(
        "Problem Success:   {:.2}%",
        summary.datapoint_success_rate * 100.0
    );
    println!("Total Time:        {:.2}s", summary.total_evaluation_time);
    println!(
        "Avg per Problem:   {:.2}s",
        summary.average_time_per_datapoint
    );

    println!("\nPass@k Metrics:");
    for (k, rate) in &report.pass_at_k_metrics {
        println!("  {}: {:.2}%", k, rate * 100.0);
    }

    println!("\n{:-<60}", "");
    println!(
        "{:<14} {:>10} {:>12} {:>10} {:>10}",
        "Problem", "Attempts", "Passed@k", "Best Rate", "Difficulty"
    );
    println!("{:-<60}", "");
    for log in &report.detailed_results {
        let problem = if log.src_uid.len() > 12 {
            format!("{}...", &log.src_uid[..9])
        } else {
            log.src_uid.clone()
        };
        println!(
            "{:<14} {:>10} {:>12} {:>9.1}% {:>10}",
            problem,
            log.attempts.len(),
            log.passed_at_k
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string()),
            log.best_success_rate * 100.0,
            log.difficulty
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    println!("{:=<60}", "");
}
