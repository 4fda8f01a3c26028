use std::sync::Arc;

use tracing::{Level, event};

use crate::core::common::{LoggingOptions, RequesterStats, ResolverStats, RunMode, RunOptions, RunSummary};
use crate::core::konst::{APP_NAME, MAX_NAME_LENGTH};
use crate::dns::client::NameResolver;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::sink::OutputSink;
use crate::pipeline::source::HostnameReader;
use crate::util::handler::{error_handler, log_handler};
use crate::util::message::{
    lookup_error_msg, resolved_msg, source_closed_msg, source_error_msg, source_open_msg, source_read_error_msg,
    token_too_long_msg,
};
use crate::util::result::run_summary;
use crate::util::time::{calc_elapsed_ms, time_now_us};
use crate::util::validate::validate_hostname_length;

/// Single-threaded baseline: every source in order, one lookup at a time.
///
/// Same input, output and error rules as the concurrent pipeline, without
/// the queue. The context is only consulted for aborts.
pub fn run_sequential(
    run_options: &RunOptions,
    resolver: &dyn NameResolver,
    context: &Arc<PipelineContext>,
    logging_options: &LoggingOptions,
) -> Result<RunSummary, PipelineError> {
    let started = time_now_us();
    let sink = OutputSink::create(&run_options.output)?;

    let mut requester_stats = Vec::with_capacity(run_options.inputs.len());
    let mut resolver_stats = ResolverStats::default();

    'sources: for source in &run_options.inputs {
        let mut stats = RequesterStats {
            source: source.clone(),
            ..Default::default()
        };

        let reader = match HostnameReader::open(source) {
            Ok(reader) => reader,
            Err(e) => {
                error_handler(&source_error_msg(source, &e));
                requester_stats.push(stats);
                continue;
            }
        };
        stats.opened = true;
        log_handler(&source_open_msg(source, "main"), logging_options);

        for token in reader {
            if context.is_aborted() {
                stats.interrupted = true;
                requester_stats.push(stats);
                break 'sources;
            }

            let hostname = match token {
                Ok(hostname) => hostname,
                Err(e) => {
                    error_handler(&source_read_error_msg(source, &e));
                    break;
                }
            };
            if !validate_hostname_length(&hostname, MAX_NAME_LENGTH) {
                error_handler(&token_too_long_msg(source, MAX_NAME_LENGTH));
                stats.skipped += 1;
                continue;
            }
            stats.enqueued += 1;

            let address = match resolver.resolve(&hostname) {
                Ok(addr) => {
                    resolver_stats.resolved += 1;
                    Some(addr)
                }
                Err(e) => {
                    event!(target: APP_NAME, Level::DEBUG, "{e}");
                    error_handler(&lookup_error_msg(&hostname));
                    resolver_stats.unresolved += 1;
                    None
                }
            };
            sink.write_line(&hostname, address)
                .map_err(PipelineError::OutputWrite)?;
            log_handler(&resolved_msg(&hostname, address), logging_options);
        }

        log_handler(&source_closed_msg(source), logging_options);
        requester_stats.push(stats);
    }

    if requester_stats.iter().any(|r| r.interrupted) {
        return Err(PipelineError::Interrupted);
    }

    let elapsed_ms = calc_elapsed_ms(started, time_now_us());
    Ok(run_summary(
        RunMode::Sequential,
        &requester_stats,
        &[resolver_stats],
        elapsed_ms,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::PipelineOptions;
    use crate::dns::client::fixture::StaticResolver;

    fn quiet() -> LoggingOptions {
        LoggingOptions {
            quiet: true,
            ..Default::default()
        }
    }

    #[test]
    fn sequential_output_is_in_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "a.test\nb.test\n").unwrap();
        std::fs::write(&b, "c.test\n").unwrap();
        let output = dir.path().join("out.txt");
        let run_options = RunOptions {
            inputs: vec![a, dir.path().join("missing.txt"), b],
            output: output.clone(),
            pipeline: PipelineOptions {
                sequential: true,
                ..Default::default()
            },
        };
        let resolver = StaticResolver::new(&[("a.test", "1.1.1.1"), ("c.test", "2.2.2.2")]);
        let context = PipelineContext::new(1).unwrap();

        let summary = run_sequential(&run_options, &resolver, &context, &quiet()).unwrap();

        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "a.test,1.1.1.1\nb.test,\nc.test,2.2.2.2\n"
        );
        assert_eq!(summary.mode, RunMode::Sequential);
        assert_eq!(summary.sources, 3);
        assert_eq!(summary.sources_skipped, 1);
        assert_eq!(summary.hostnames, 3);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(resolver.calls(), 3);
    }

    #[test]
    fn aborted_sequential_run_is_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "a.test\n").unwrap();
        let run_options = RunOptions {
            inputs: vec![input],
            output: dir.path().join("out.txt"),
            pipeline: PipelineOptions::default(),
        };
        let context = PipelineContext::new(1).unwrap();
        context.abort();

        let result = run_sequential(&run_options, &StaticResolver::default(), &context, &quiet());

        assert!(matches!(result, Err(PipelineError::Interrupted)));
    }

    /// Aborts the run while the last hostname is being looked up.
    struct AbortingResolver(Arc<PipelineContext>);

    impl NameResolver for AbortingResolver {
        fn resolve(&self, _hostname: &str) -> Result<std::net::IpAddr, crate::dns::client::LookupError> {
            self.0.abort();
            Ok("1.1.1.1".parse().unwrap())
        }
    }

    #[test]
    fn abort_during_the_last_lookup_keeps_the_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "a.test\n").unwrap();
        let output = dir.path().join("out.txt");
        let run_options = RunOptions {
            inputs: vec![input],
            output: output.clone(),
            pipeline: PipelineOptions::default(),
        };
        let context = PipelineContext::new(1).unwrap();
        let resolver = AbortingResolver(context.clone());

        let summary = run_sequential(&run_options, &resolver, &context, &quiet()).unwrap();

        assert!(context.is_aborted());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "a.test,1.1.1.1\n");
        assert_eq!(summary.resolved, 1);
    }
}
