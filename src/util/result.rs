use crate::core::common::{RequesterStats, ResolverStats, RunMode, RunSummary};

/// Fold the per-worker statistics of a run into one summary.
pub fn run_summary(
    mode: RunMode,
    requesters: &[RequesterStats],
    resolvers: &[ResolverStats],
    elapsed_ms: f64,
) -> RunSummary {
    let resolved: usize = resolvers.iter().map(|r| r.resolved).sum();
    let unresolved: usize = resolvers.iter().map(|r| r.unresolved).sum();

    RunSummary {
        mode,
        sources: requesters.len(),
        sources_skipped: requesters.iter().filter(|r| !r.opened).count(),
        hostnames: requesters.iter().map(|r| r.enqueued).sum(),
        tokens_skipped: requesters.iter().map(|r| r.skipped).sum(),
        resolved,
        unresolved,
        failure_percent: calc_failure_percent(resolved + unresolved, unresolved),
        elapsed_ms,
    }
}

/// Calculate the percentage of hostnames that
/// did not resolve out of all hostnames looked up
pub fn calc_failure_percent(total: usize, failed: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = failed as f64 / total as f64;
    percent * 100.0
}
