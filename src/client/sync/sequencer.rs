//! Refresh sequencing
//!
//! Refreshes may overlap: a realtime frame can arrive while a focus refresh
//! is still in flight. Every refresh takes a ticket before it starts and may
//! only apply its result if that ticket is still the latest one issued, so a
//! slow response can never overwrite a newer one. After teardown no ticket
//! is current.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Identifies one refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RefreshSequencer {
    latest: AtomicU64,
    torn_down: AtomicBool,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next ticket; all earlier tickets become stale
    pub fn issue(&self) -> RefreshTicket {
        RefreshTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether a result for `ticket` may still be applied
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        !self.is_torn_down() && self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Reject every outstanding and future result
    pub fn tear_down(&self) {
        self.torn_down.store(true, Ordering::SeqCst);
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}
