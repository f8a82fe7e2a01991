//! Registration and status receiver
//!
//! This loop owns the inbound side of the shared socket: it waits for
//! datagrams, decodes each once at the boundary and acts on the result.
//!
//! # Handling
//!
//! | Message | Action |
//! |---------|--------|
//! | `Register` | Assign next identifier, unicast `ASSIGNED UTR #<n>` to the source |
//! | `Status` | Log verbatim with the source address, no reply |
//! | `Probe` | Dropped; the historian hears its own keepalive broadcasts |
//! | `Raw` | Dropped; operator free text and garbled frames carry no meaning here |
//!
//! # Error Policy
//!
//! Registration replies are fire-and-forget: a failed send is logged and the
//! loop continues. A receive failure other than the read timeout is treated
//! as a persistent socket fault; the loop reports it and requests cooperative
//! shutdown of the whole session instead of aborting the process.

use crate::error::Result;
use crate::protocol::{self, Message};
use crate::registry::UnitRegistry;
use crate::stats::SessionStats;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver loop over the shared telemetry socket
pub struct TelemetryReceiver {
    socket: Arc<UdpSocket>,
    registry: Arc<UnitRegistry>,
    stats: Arc<SessionStats>,
    running: Arc<AtomicBool>,
}

impl TelemetryReceiver {
    /// Create a new receiver
    pub fn new(
        socket: Arc<UdpSocket>,
        registry: Arc<UnitRegistry>,
        stats: Arc<SessionStats>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            socket,
            registry,
            stats,
            running,
        }
    }

    /// Run the receiver loop until the running flag clears
    pub fn run(&mut self) -> Result<()> {
        log::info!("receiver started on {}", self.socket.local_addr()?);

        let mut buf = [0u8; protocol::FRAME_LEN];

        while self.running.load(Ordering::Relaxed) {
            match self.socket.recv_from(&mut buf) {
                Ok((len, src)) => {
                    self.stats.datagrams_received.fetch_add(1, Ordering::Relaxed);
                    self.handle_datagram(&buf[..len], src);
                }
                // Read timeout: wake to re-check the running flag.
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => continue,
                Err(e) => {
                    log::error!("receive failed: {}", e);
                    self.running.store(false, Ordering::Relaxed);
                    return Err(e.into());
                }
            }
        }

        log::info!("receiver stopped");
        Ok(())
    }

    fn handle_datagram(&self, datagram: &[u8], src: SocketAddr) {
        match Message::decode(datagram) {
            Message::Register => self.handle_registration(src),
            Message::Status(text) => {
                log::info!("status from {}: {}", src, text);
                self.stats.status_updates.fetch_add(1, Ordering::Relaxed);
            }
            Message::Probe | Message::Raw(_) => {
                self.stats.datagrams_ignored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn handle_registration(&self, src: SocketAddr) {
        let unit_id = self.registry.assign();
        self.stats.registrations.fetch_add(1, Ordering::Relaxed);

        let reply = protocol::assignment_reply(unit_id);
        let frame = protocol::encode_frame(&reply);

        match self.socket.send_to(&frame, src) {
            Ok(_) => log::info!("assigned UTR #{} to {}", unit_id, src),
            Err(e) => log::warn!("failed to send assignment to {}: {}", src, e),
        }
    }
}
