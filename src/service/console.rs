//! Operator console loop
//!
//! Every line the operator types is broadcast verbatim to the network as a
//! 60-byte frame; interpretation is entirely the remote units' concern. The
//! literal line `END` additionally requests shutdown; the frame is still
//! broadcast first, so units see the word exactly as typed.
//!
//! Stdin is read by a detached reader thread that forwards raw lines (line
//! terminator preserved) over a channel. The loop itself multiplexes that
//! channel against a poll timeout so it can observe the running flag even
//! while no input arrives; end-of-input is treated as a shutdown request.

use crate::error::Result;
use crate::protocol;
use crate::stats::SessionStats;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::{BufRead, Write};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How often the loop wakes to re-check the running flag
const POLL_PERIOD: Duration = Duration::from_millis(200);

/// Console prompt shown before each input line
const PROMPT: &str = ">>> ";

/// Spawn the detached stdin reader and return its line channel
///
/// The reader blocks in `read_line` and cannot be interrupted portably; it is
/// reclaimed by process exit. Dropping its sender on EOF disconnects the
/// channel, which the console loop maps to a shutdown request.
pub fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded();

    let spawned = std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut stdin = stdin.lock();
            loop {
                print!("{}", PROMPT);
                let _ = std::io::stdout().flush();

                let mut line = String::new();
                match stdin.read_line(&mut line) {
                    Ok(0) => break, // EOF
                    Ok(_) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("console read failed: {}", e);
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        log::error!("failed to spawn stdin reader: {}", e);
    }

    rx
}

/// Console loop that broadcasts operator commands
pub struct ConsoleBroadcaster {
    socket: Arc<UdpSocket>,
    broadcast_addr: SocketAddr,
    stats: Arc<SessionStats>,
    running: Arc<AtomicBool>,
    line_rx: Receiver<String>,
}

impl ConsoleBroadcaster {
    /// Create a new console loop over a line channel
    pub fn new(
        socket: Arc<UdpSocket>,
        broadcast_addr: SocketAddr,
        stats: Arc<SessionStats>,
        running: Arc<AtomicBool>,
        line_rx: Receiver<String>,
    ) -> Self {
        Self {
            socket,
            broadcast_addr,
            stats,
            running,
            line_rx,
        }
    }

    /// Run the console loop until shutdown
    pub fn run(&mut self) -> Result<()> {
        log::info!("console started (type END to shut down)");

        loop {
            if !self.running.load(Ordering::Relaxed) {
                break;
            }

            match self.line_rx.recv_timeout(POLL_PERIOD) {
                Ok(line) => self.handle_line(&line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("console input closed, shutting down");
                    self.running.store(false, Ordering::Relaxed);
                    break;
                }
            }
        }

        log::info!("console stopped");
        Ok(())
    }

    /// Broadcast one operator line and apply its local meaning
    fn handle_line(&self, line: &str) {
        let frame = protocol::encode_frame(line);
        if let Err(e) = self.socket.send_to(&frame, self.broadcast_addr) {
            log::warn!("broadcast to {} failed: {}", self.broadcast_addr, e);
        } else {
            self.stats.commands_sent.fetch_add(1, Ordering::Relaxed);
        }

        if line == protocol::SHUTDOWN_COMMAND {
            log::info!("shutdown requested from console");
            self.running.store(false, Ordering::Relaxed);
        } else {
            println!("> sent: {}", line.trim_end());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FRAME_LEN;
    use std::time::Duration;

    fn loopback_pair() -> (Arc<UdpSocket>, UdpSocket, SocketAddr) {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        peer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let peer_addr = peer.local_addr().unwrap();

        let sender = Arc::new(UdpSocket::bind("127.0.0.1:0").unwrap());
        (sender, peer, peer_addr)
    }

    fn console_for(
        socket: Arc<UdpSocket>,
        target: SocketAddr,
    ) -> (ConsoleBroadcaster, Arc<AtomicBool>, Arc<SessionStats>) {
        let stats = Arc::new(SessionStats::new());
        let running = Arc::new(AtomicBool::new(true));
        let (_tx, rx) = crossbeam_channel::unbounded();
        let console = ConsoleBroadcaster::new(
            socket,
            target,
            Arc::clone(&stats),
            Arc::clone(&running),
            rx,
        );
        (console, running, stats)
    }

    #[test]
    fn test_line_is_broadcast_verbatim() {
        let (sender, peer, peer_addr) = loopback_pair();
        let (console, running, stats) = console_for(sender, peer_addr);

        console.handle_line("WATER NOW\n");

        let mut buf = [0u8; FRAME_LEN];
        let (len, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(len, FRAME_LEN);
        assert_eq!(&buf[..10], b"WATER NOW\n");
        assert!(buf[10..].iter().all(|&b| b == 0));

        // An ordinary command leaves the session running.
        assert!(running.load(Ordering::Relaxed));
        assert_eq!(stats.commands_sent.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_end_is_broadcast_then_clears_running() {
        let (sender, peer, peer_addr) = loopback_pair();
        let (console, running, _stats) = console_for(sender, peer_addr);

        console.handle_line("END\n");

        // The frame goes out before the flag clears.
        let mut buf = [0u8; FRAME_LEN];
        let (len, _) = peer.recv_from(&mut buf).unwrap();
        assert_eq!(len, FRAME_LEN);
        assert_eq!(&buf[..4], b"END\n");

        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_end_without_terminator_is_an_ordinary_command() {
        let (sender, peer, peer_addr) = loopback_pair();
        let (console, running, _stats) = console_for(sender, peer_addr);

        // Only the exact line "END\n" shuts down.
        console.handle_line("END");

        let mut buf = [0u8; FRAME_LEN];
        peer.recv_from(&mut buf).unwrap();
        assert!(running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_disconnected_channel_requests_shutdown() {
        let (sender, _peer, peer_addr) = loopback_pair();
        let (mut console, running, _stats) = console_for(sender, peer_addr);
        // Channel sender already dropped in console_for; run() must exit.
        console.run().unwrap();
        assert!(!running.load(Ordering::Relaxed));
    }
}
