//! Unbiased pass@k estimation
//!
//! For a problem with `n` independent attempts of which `c` succeeded,
//! the probability that at least one of `k` randomly drawn attempts
//! succeeds is estimated without bias by
//!
//! ```text
//! pass@k = 1 - C(n-c, k) / C(n, k)
//! ```
//!
//! evaluated as a running product so no factorial ever overflows.

use std::collections::BTreeMap;

use super::DatapointLog;

/// Unbiased single-problem estimate; 1.0 when `n - c < k`
pub fn estimate_pass_at_k(n: usize, c: usize, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    if n.saturating_sub(c) < k {
        return 1.0;
    }
    1.0 - (1..=k).fold(1.0_f64, |acc, i| {
        acc * (n - c - k + i) as f64 / (n - k + i) as f64
    })
}

/// Mean pass@k over all problems with at least one attempt, for every
/// k in `1..=max_k`.
///
/// When a problem ran fewer than `k` attempts, the estimate uniformly
/// substitutes the number actually run for `k`, never an error or NaN.
pub fn pass_at_k_summary(logs: &[DatapointLog], max_k: u32) -> BTreeMap<String, f64> {
    let counts: Vec<(usize, usize)> = logs
        .iter()
        .filter(|log| !log.attempts.is_empty())
        .map(|log| (log.attempts.len(), log.success_count()))
        .collect();

    let mut summary = BTreeMap::new();
    if counts.is_empty() {
        return summary;
    }

    for k in 1..=max_k.max(1) as usize {
        let mean = counts
            .iter()
            .map(|(n, c)| estimate_pass_at_k(*n, *c, k.min(*n)))
            .sum::<f64>()
            / counts.len() as f64;
        summary.insert(format!("pass@{}", k), mean);
    }
    summary
}
