//! Metrics: attempt records, datapoint logs and pass@k estimation

mod aggregator;
mod log;
mod pass_at_k;

pub use aggregator::{
    FinalReport, ReportAggregator, SummaryStatistics, TimingStatistics, write_attempt_log,
};
pub use log::{AttemptRecord, DatapointLog};
pub use pass_at_k::{estimate_pass_at_k, pass_at_k_summary};
