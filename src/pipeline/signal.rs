/// "Producers still active" flag.
///
/// Kept inside the lock-protected pipeline state next to the queue. The
/// orchestrator flips it once every requester has been joined; resolvers
/// only read it, always together with an emptiness check.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    done: bool,
}

impl ShutdownSignal {
    pub fn new() -> ShutdownSignal {
        ShutdownSignal::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Idempotent. Once done, the signal never reverts.
    pub fn mark_done(&mut self) {
        self.done = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_producing() {
        assert!(!ShutdownSignal::new().is_done());
    }

    #[test]
    fn mark_done_is_idempotent() {
        let mut signal = ShutdownSignal::new();
        signal.mark_done();
        assert!(signal.is_done());
        signal.mark_done();
        assert!(signal.is_done());
    }
}
