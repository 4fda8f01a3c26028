use std::sync::Arc;

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::pipeline::error::PipelineError;
use crate::pipeline::queue::BoundedQueue;
use crate::pipeline::signal::ShutdownSignal;

/// Everything guarded by the pipeline lock.
#[derive(Debug)]
pub struct QueueState {
    pub queue: BoundedQueue<String>,
    pub shutdown: ShutdownSignal,
    pub aborted: bool,
}

/// Shared state of one pipeline run.
///
/// Created by the orchestrator before any worker exists and handed to every
/// worker behind an `Arc`. The queue and the shutdown signal share one lock;
/// requesters wait on `slot_freed` while the queue is full and resolvers wait
/// on `item_ready` while it is empty and requesters are still active.
#[derive(Debug)]
pub struct PipelineContext {
    state: Mutex<QueueState>,
    pub slot_freed: Condvar,
    pub item_ready: Condvar,
}

impl PipelineContext {
    pub fn new(capacity: usize) -> Result<Arc<PipelineContext>, PipelineError> {
        let state = QueueState {
            queue: BoundedQueue::new(capacity)?,
            shutdown: ShutdownSignal::new(),
            aborted: false,
        };
        Ok(Arc::new(PipelineContext {
            state: Mutex::new(state),
            slot_freed: Condvar::new(),
            item_ready: Condvar::new(),
        }))
    }

    pub fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock()
    }

    /// Tell resolvers no more hostnames will arrive.
    pub fn mark_done(&self) {
        let mut state = self.state.lock();
        state.shutdown.mark_done();
        self.item_ready.notify_all();
    }

    /// Stop every worker as soon as it next touches the queue.
    pub fn abort(&self) {
        let mut state = self.state.lock();
        state.aborted = true;
        self.slot_freed.notify_all();
        self.item_ready.notify_all();
    }

    pub fn is_aborted(&self) -> bool {
        self.state.lock().aborted
    }
}

/// Cloneable handle that aborts a running pipeline, e.g. on Ctrl-C.
#[derive(Clone, Debug)]
pub struct AbortHandle {
    context: Arc<PipelineContext>,
}

impl AbortHandle {
    pub fn new(context: Arc<PipelineContext>) -> AbortHandle {
        AbortHandle { context }
    }

    pub fn abort(&self) {
        self.context.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn mark_done_wakes_waiting_consumer() {
        let context = PipelineContext::new(2).unwrap();
        let waiter = {
            let context = context.clone();
            thread::spawn(move || {
                let mut state = context.lock();
                while state.queue.is_empty() && !state.shutdown.is_done() {
                    context.item_ready.wait(&mut state);
                }
                state.shutdown.is_done()
            })
        };

        thread::sleep(Duration::from_millis(20));
        context.mark_done();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn abort_wakes_waiting_producer() {
        let context = PipelineContext::new(1).unwrap();
        context.lock().queue.push("a.test".to_owned()).unwrap();

        let waiter = {
            let context = context.clone();
            thread::spawn(move || {
                let mut state = context.lock();
                while state.queue.is_full() && !state.aborted {
                    context.slot_freed.wait(&mut state);
                }
                state.aborted
            })
        };

        thread::sleep(Duration::from_millis(20));
        AbortHandle::new(context.clone()).abort();
        assert!(waiter.join().unwrap());
        assert!(context.is_aborted());
    }
}
