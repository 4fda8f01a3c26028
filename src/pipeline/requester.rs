use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use crate::core::common::{LoggingOptions, RequesterStats};
use crate::core::konst::MAX_NAME_LENGTH;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::source::HostnameReader;
use crate::util::handler::{error_handler, log_handler};
use crate::util::message::{
    enqueued_msg, source_closed_msg, source_error_msg, source_open_msg, source_read_error_msg, token_too_long_msg,
};
use crate::util::validate::validate_hostname_length;

/// Producer: feeds every hostname of one input file into the queue.
pub struct RequesterWorker {
    pub source: PathBuf,
    pub context: Arc<PipelineContext>,
    pub logging_options: LoggingOptions,
}

impl RequesterWorker {
    /// An unreadable source is reported and skipped, never fatal.
    pub fn run(&self) -> RequesterStats {
        let mut stats = RequesterStats {
            source: self.source.clone(),
            ..Default::default()
        };

        let reader = match HostnameReader::open(&self.source) {
            Ok(reader) => reader,
            Err(e) => {
                error_handler(&source_error_msg(&self.source, &e));
                return stats;
            }
        };
        stats.opened = true;

        let current = thread::current();
        let worker = current.name().unwrap_or("requester");
        log_handler(&source_open_msg(&self.source, worker), &self.logging_options);

        self.enqueue_all(reader, &mut stats);

        log_handler(&source_closed_msg(&self.source), &self.logging_options);
        stats
    }

    pub fn enqueue_all<R: BufRead>(&self, reader: HostnameReader<R>, stats: &mut RequesterStats) {
        for token in reader {
            let hostname = match token {
                Ok(hostname) => hostname,
                Err(e) => {
                    // Keep what was already enqueued, drop the rest of this source.
                    error_handler(&source_read_error_msg(&self.source, &e));
                    break;
                }
            };

            if !validate_hostname_length(&hostname, MAX_NAME_LENGTH) {
                error_handler(&token_too_long_msg(&self.source, MAX_NAME_LENGTH));
                stats.skipped += 1;
                continue;
            }

            let msg = enqueued_msg(&hostname);
            if !enqueue(&self.context, hostname) {
                stats.interrupted = true;
                break;
            }
            stats.enqueued += 1;
            log_handler(&msg, &self.logging_options);
        }
    }
}

/// Push one hostname, blocking while the queue is full.
///
/// A full queue hands the hostname back; the requester then sleeps on
/// `slot_freed` and retries, rechecking after every wakeup. Returns `false`
/// if the pipeline was aborted before the hostname got in.
pub fn enqueue(context: &PipelineContext, hostname: String) -> bool {
    let mut state = context.lock();
    let mut pending = hostname;
    loop {
        if state.aborted {
            return false;
        }
        match state.queue.push(pending) {
            Ok(()) => break,
            Err(rejected) => {
                pending = rejected;
                context.slot_freed.wait(&mut state);
            }
        }
    }
    context.item_ready.notify_one();
    true
}
