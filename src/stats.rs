//! Session traffic counters
//!
//! Updated lock-free by the worker loops and logged periodically by the main
//! thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one historian session
#[derive(Debug, Default)]
pub struct SessionStats {
    /// Datagrams received on the shared socket
    pub datagrams_received: AtomicU64,
    /// Status reports logged
    pub status_updates: AtomicU64,
    /// Registration replies sent
    pub registrations: AtomicU64,
    /// Liveness probes broadcast
    pub probes_sent: AtomicU64,
    /// Operator command lines broadcast
    pub commands_sent: AtomicU64,
    /// Datagrams dropped without action (probes, free text, garbled frames)
    pub datagrams_ignored: AtomicU64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-line summary for periodic logging
    pub fn summary(&self) -> String {
        format!(
            "rx={} status={} registered={} probes={} commands={} ignored={}",
            self.datagrams_received.load(Ordering::Relaxed),
            self.status_updates.load(Ordering::Relaxed),
            self.registrations.load(Ordering::Relaxed),
            self.probes_sent.load(Ordering::Relaxed),
            self.commands_sent.load(Ordering::Relaxed),
            self.datagrams_ignored.load(Ordering::Relaxed),
        )
    }
}
