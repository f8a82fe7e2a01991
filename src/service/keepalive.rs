//! Liveness probe loop
//!
//! Broadcasts the constant `HELLO?` frame at a fixed interval so units can
//! tell the station is alive. Fire-and-forget: no acknowledgement is expected
//! or processed, and a failed send is logged and skipped.

use crate::error::Result;
use crate::protocol;
use crate::stats::SessionStats;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Interval between probes (fixed, not configurable)
pub const PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Sleep slice so the loop observes the running flag promptly
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Keepalive loop that broadcasts liveness probes
pub struct ProbePublisher {
    socket: Arc<UdpSocket>,
    broadcast_addr: SocketAddr,
    stats: Arc<SessionStats>,
    running: Arc<AtomicBool>,
}

impl ProbePublisher {
    /// Create a new probe publisher
    pub fn new(
        socket: Arc<UdpSocket>,
        broadcast_addr: SocketAddr,
        stats: Arc<SessionStats>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            broadcast_addr,
            stats,
            running,
        }
    }

    /// Run the keepalive loop until the running flag clears
    ///
    /// The first probe goes out immediately; each subsequent one follows
    /// after [`PROBE_INTERVAL`].
    pub fn run(&mut self) -> Result<()> {
        log::info!(
            "keepalive started ({}s interval to {})",
            PROBE_INTERVAL.as_secs(),
            self.broadcast_addr
        );

        let frame = protocol::encode_frame(protocol::PROBE);

        while self.running.load(Ordering::Relaxed) {
            match self.socket.send_to(&frame, self.broadcast_addr) {
                Ok(_) => {
                    self.stats.probes_sent.fetch_add(1, Ordering::Relaxed);
                    log::trace!("probe sent to {}", self.broadcast_addr);
                }
                Err(e) => log::warn!("probe send failed: {}", e),
            }

            self.sleep_interval();
        }

        log::info!("keepalive stopped");
        Ok(())
    }

    /// Sleep for one probe interval, waking early if shutdown is requested
    fn sleep_interval(&self) {
        let deadline = Instant::now() + PROBE_INTERVAL;
        while self.running.load(Ordering::Relaxed) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            std::thread::sleep(remaining.min(SLEEP_SLICE));
        }
    }
}
