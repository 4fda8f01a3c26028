use std::io::Write;
use std::sync::Arc;

use tracing::{Level, event};

use crate::core::common::{LoggingOptions, ResolverStats};
use crate::core::konst::APP_NAME;
use crate::dns::client::NameResolver;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::error::PipelineError;
use crate::pipeline::sink::OutputSink;
use crate::util::handler::{error_handler, log_handler};
use crate::util::message::{lookup_error_msg, resolved_msg, resolving_msg};

/// Consumer: pops hostnames, resolves them and writes one line each.
pub struct ResolverWorker<W> {
    pub context: Arc<PipelineContext>,
    pub sink: Arc<OutputSink<W>>,
    pub resolver: Arc<dyn NameResolver>,
    pub logging_options: LoggingOptions,
}

impl<W: Write> ResolverWorker<W> {
    /// Runs until the queue is drained and requesters are done, or the
    /// pipeline is aborted. Only an output failure is fatal; it aborts the
    /// pipeline so no sibling stays blocked, then goes back to the
    /// orchestrator.
    pub fn run(&self) -> Result<ResolverStats, PipelineError> {
        let mut stats = ResolverStats::default();

        while let Some(hostname) = dequeue(&self.context) {
            log_handler(&resolving_msg(&hostname), &self.logging_options);

            // The queue lock is not held here.
            let address = match self.resolver.resolve(&hostname) {
                Ok(addr) => {
                    stats.resolved += 1;
                    Some(addr)
                }
                Err(e) => {
                    event!(target: APP_NAME, Level::DEBUG, "{e}");
                    error_handler(&lookup_error_msg(&hostname));
                    stats.unresolved += 1;
                    None
                }
            };

            if let Err(e) = self.sink.write_line(&hostname, address) {
                self.context.abort();
                return Err(PipelineError::OutputWrite(e));
            }
            log_handler(&resolved_msg(&hostname, address), &self.logging_options);
        }

        Ok(stats)
    }
}

/// Pop the next hostname, blocking while the queue is empty and requesters
/// are still active.
///
/// Every pop wakes one requester blocked on a full queue. `None` means the
/// worker is finished: either the queue is empty after the shutdown signal,
/// checked under the same lock, or the pipeline was aborted.
pub fn dequeue(context: &PipelineContext) -> Option<String> {
    let mut state = context.lock();
    loop {
        if state.aborted {
            return None;
        }
        if let Some(hostname) = state.queue.pop() {
            context.slot_freed.notify_one();
            return Some(hostname);
        }
        if state.shutdown.is_done() {
            return None;
        }
        context.item_ready.wait(&mut state);
    }
}
