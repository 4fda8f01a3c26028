use std::net::IpAddr;
use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::core::common::{RunMode, RunOptions, RunSummary};

pub fn run_header_msg(run_options: &RunOptions) -> String {
    let mode = match run_options.pipeline.sequential {
        true => RunMode::Sequential,
        false => RunMode::Concurrent,
    };
    format!(
        "Resolving {} input file(s) into {} ({mode}, resolvers={}, queue={})",
        run_options.inputs.len(),
        run_options.output.display(),
        run_options.pipeline.resolvers,
        run_options.pipeline.queue_capacity,
    )
}

pub fn source_open_msg(source: &Path, worker: &str) -> String {
    format!("Req> reading {} from {worker}", source.display())
}

pub fn source_closed_msg(source: &Path) -> String {
    format!("Req> closed input file {}", source.display())
}

pub fn source_error_msg(source: &Path, error: &std::io::Error) -> String {
    format!("Error Opening Input File: {}: {error}", source.display())
}

pub fn source_read_error_msg(source: &Path, error: &std::io::Error) -> String {
    format!("Error Reading Input File: {}: {error}", source.display())
}

pub fn token_too_long_msg(source: &Path, max: usize) -> String {
    format!("Req> skipping token over {max} bytes in {}", source.display())
}

pub fn enqueued_msg(hostname: &str) -> String {
    format!("Req> {hostname} enqueued")
}

pub fn resolving_msg(hostname: &str) -> String {
    format!("Res> resolving {hostname}")
}

pub fn resolved_msg(hostname: &str, address: Option<IpAddr>) -> String {
    match address {
        Some(addr) => format!("Res> {hostname} resolved to {addr}"),
        None => format!("Res> {hostname} unresolved"),
    }
}

pub fn lookup_error_msg(hostname: &str) -> String {
    format!("dnslookup error: {hostname}")
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Sources")]
    sources: usize,
    #[tabled(rename = "Skipped Sources")]
    sources_skipped: usize,
    #[tabled(rename = "Hostnames")]
    hostnames: usize,
    #[tabled(rename = "Resolved")]
    resolved: usize,
    #[tabled(rename = "Unresolved")]
    unresolved: usize,
    #[tabled(rename = "Failure (%)")]
    failure_percent: String,
    #[tabled(rename = "Elapsed (ms)")]
    elapsed_ms: String,
}

/// Render the run summary as a terminal table.
pub fn summary_table_msg(summary: &RunSummary) -> String {
    let row = SummaryRow {
        mode: summary.mode.to_string(),
        sources: summary.sources,
        sources_skipped: summary.sources_skipped,
        hostnames: summary.hostnames,
        resolved: summary.resolved,
        unresolved: summary.unresolved,
        failure_percent: format!("{:.2}", summary.failure_percent),
        elapsed_ms: format!("{:.3}", summary.elapsed_ms),
    };
    let mut table = Table::new(vec![row]);
    table.with(Style::modern());

    let mut msg = format!("\n{table}");
    if summary.tokens_skipped > 0 {
        msg.push_str(&format!("\n{} over-long token(s) skipped", summary.tokens_skipped));
    }
    msg
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::core::common::PipelineOptions;

    #[test]
    fn resolved_msg_shows_address_or_unresolved() {
        let addr: IpAddr = "1.1.1.1".parse().unwrap();
        assert_eq!(resolved_msg("a.test", Some(addr)), "Res> a.test resolved to 1.1.1.1");
        assert_eq!(resolved_msg("b.test", None), "Res> b.test unresolved");
    }

    #[test]
    fn lookup_error_msg_is_expected() {
        assert_eq!(lookup_error_msg("bogus.invalid"), "dnslookup error: bogus.invalid");
    }

    #[test]
    fn run_header_msg_is_expected() {
        let run_options = RunOptions {
            inputs: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
            output: PathBuf::from("out.txt"),
            pipeline: PipelineOptions::default(),
        };
        assert_eq!(
            run_header_msg(&run_options),
            "Resolving 2 input file(s) into out.txt (concurrent, resolvers=10, queue=5)"
        );
    }

    #[test]
    fn summary_table_contains_totals() {
        let summary = RunSummary {
            sources: 2,
            hostnames: 3,
            resolved: 2,
            unresolved: 1,
            failure_percent: 33.333,
            tokens_skipped: 4,
            ..Default::default()
        };
        let table = summary_table_msg(&summary);
        assert!(table.contains("Hostnames"));
        assert!(table.contains("concurrent"));
        assert!(table.contains("33.33"));
        assert!(table.contains("4 over-long token(s) skipped"));
    }
}
