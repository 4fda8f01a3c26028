use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{Level, event};

use crate::core::common::{LoggingOptions, RunMode, RunOptions, RunSummary};
use crate::core::konst::APP_NAME;
use crate::dns::client::NameResolver;
use crate::pipeline::context::{AbortHandle, PipelineContext};
use crate::pipeline::error::PipelineError;
use crate::pipeline::requester::RequesterWorker;
use crate::pipeline::resolver::ResolverWorker;
use crate::pipeline::sequential::run_sequential;
use crate::pipeline::sink::OutputSink;
use crate::util::result::run_summary;
use crate::util::time::{calc_elapsed_ms, time_now_us};
use crate::util::validate::validate_pipeline_options;

/// One run: a set of input files resolved into one output file.
pub struct Pipeline {
    run_options: RunOptions,
    resolver: Arc<dyn NameResolver>,
    logging_options: LoggingOptions,
    context: Arc<PipelineContext>,
}

impl Pipeline {
    /// Validates the run and allocates the shared state. Nothing touches the
    /// filesystem yet, so a rejected configuration leaves no output file.
    pub fn new(
        run_options: RunOptions,
        resolver: Arc<dyn NameResolver>,
        logging_options: LoggingOptions,
    ) -> Result<Pipeline, PipelineError> {
        validate_pipeline_options(&run_options.pipeline, run_options.inputs.len())?;
        let context = PipelineContext::new(run_options.pipeline.queue_capacity)?;
        Ok(Pipeline {
            run_options,
            resolver,
            logging_options,
            context,
        })
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle::new(self.context.clone())
    }

    /// Open the output, start every requester and the resolver pool, join
    /// the requesters, raise the shutdown signal, then join the resolvers.
    pub fn run(self) -> Result<RunSummary, PipelineError> {
        if self.run_options.pipeline.sequential {
            return run_sequential(
                &self.run_options,
                self.resolver.as_ref(),
                &self.context,
                &self.logging_options,
            );
        }

        let started = time_now_us();
        let sink = Arc::new(OutputSink::create(&self.run_options.output)?);

        let mut spawn_failure = None;

        let mut requesters = Vec::with_capacity(self.run_options.inputs.len());
        for (i, source) in self.run_options.inputs.iter().enumerate() {
            let worker = RequesterWorker {
                source: source.clone(),
                context: self.context.clone(),
                logging_options: self.logging_options.clone(),
            };
            let name = format!("requester-{i}");
            match spawn_worker(name.clone(), &self.context, move || worker.run()) {
                Ok(handle) => {
                    event!(target: APP_NAME, Level::DEBUG, "created {name} for {}", source.display());
                    requesters.push((name, handle));
                }
                Err(e) => {
                    spawn_failure = Some(e);
                    break;
                }
            }
        }

        let mut resolvers = Vec::with_capacity(self.run_options.pipeline.resolvers);
        if spawn_failure.is_none() {
            for i in 0..self.run_options.pipeline.resolvers {
                let worker = ResolverWorker {
                    context: self.context.clone(),
                    sink: sink.clone(),
                    resolver: self.resolver.clone(),
                    logging_options: self.logging_options.clone(),
                };
                let name = format!("resolver-{i}");
                match spawn_worker(name.clone(), &self.context, move || worker.run()) {
                    Ok(handle) => {
                        event!(target: APP_NAME, Level::DEBUG, "created {name}");
                        resolvers.push((name, handle));
                    }
                    Err(e) => {
                        spawn_failure = Some(e);
                        break;
                    }
                }
            }
        }

        // Whatever did start must still be joined before the error goes up.
        if spawn_failure.is_some() {
            self.context.abort();
        }

        let mut worker_failure = None;

        let mut requester_stats = Vec::with_capacity(requesters.len());
        for (name, handle) in requesters {
            match handle.join() {
                Ok(stats) => requester_stats.push(stats),
                Err(_) => {
                    event!(target: APP_NAME, Level::ERROR, "{name} panicked");
                    worker_failure.get_or_insert(PipelineError::WorkerPanicked(name));
                }
            }
        }

        self.context.mark_done();

        let mut resolver_stats = Vec::with_capacity(resolvers.len());
        for (name, handle) in resolvers {
            match handle.join() {
                Ok(Ok(stats)) => resolver_stats.push(stats),
                Ok(Err(e)) => {
                    event!(target: APP_NAME, Level::ERROR, "{name} failed: {e}");
                    worker_failure.get_or_insert(e);
                }
                Err(_) => {
                    event!(target: APP_NAME, Level::ERROR, "{name} panicked");
                    worker_failure.get_or_insert(PipelineError::WorkerPanicked(name));
                }
            }
        }

        // Closes the output file.
        drop(sink);

        if let Some(e) = spawn_failure.or(worker_failure) {
            return Err(e);
        }

        let elapsed_ms = calc_elapsed_ms(started, time_now_us());
        let summary = run_summary(RunMode::Concurrent, &requester_stats, &resolver_stats, elapsed_ms);

        // An abort that lands after the last line was written changes nothing.
        let cut_short = requester_stats.iter().any(|r| r.interrupted)
            || summary.hostnames != summary.resolved + summary.unresolved;
        if self.context.is_aborted() && cut_short {
            return Err(PipelineError::Interrupted);
        }
        Ok(summary)
    }
}

/// Aborts the pipeline if the owning worker thread unwinds, so siblings
/// blocked on the queue are released.
struct AbortOnPanic(Arc<PipelineContext>);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

fn spawn_worker<T, F>(name: String, context: &Arc<PipelineContext>, f: F) -> Result<JoinHandle<T>, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = AbortOnPanic(context.clone());
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _guard = guard;
            f()
        })
        .map_err(|source| PipelineError::WorkerSpawn { name, source })
}
