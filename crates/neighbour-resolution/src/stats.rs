//! Dispatch statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the engine counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames offered to the engine
    pub frames_received: u64,
    /// Frames that were not neighbour messages
    pub frames_ignored: u64,
    /// Neighbour messages dispatched (with or without handlers)
    pub messages_dispatched: u64,
    /// Handler invocations
    pub handlers_invoked: u64,
    /// Handler invocations that returned an error or panicked
    pub handler_faults: u64,
    /// Frames handed to the packet transport
    pub frames_emitted: u64,
    /// Emissions suppressed because the port is not an edge port
    pub frames_guarded: u64,
}

#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub frames_received: AtomicU64,
    pub frames_ignored: AtomicU64,
    pub messages_dispatched: AtomicU64,
    pub handlers_invoked: AtomicU64,
    pub handler_faults: AtomicU64,
    pub frames_emitted: AtomicU64,
    pub frames_guarded: AtomicU64,
}

impl DispatchCounters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_ignored: self.frames_ignored.load(Ordering::Relaxed),
            messages_dispatched: self.messages_dispatched.load(Ordering::Relaxed),
            handlers_invoked: self.handlers_invoked.load(Ordering::Relaxed),
            handler_faults: self.handler_faults.load(Ordering::Relaxed),
            frames_emitted: self.frames_emitted.load(Ordering::Relaxed),
            frames_guarded: self.frames_guarded.load(Ordering::Relaxed),
        }
    }
}
