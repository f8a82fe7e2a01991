//! Session orchestration
//!
//! The [`Historian`] context owns everything the three worker loops share:
//! the broadcast-capable socket, the resolved broadcast address, the unit
//! registry, the session counters and the running flag. The loops run on
//! named threads and are all joined on shutdown, whether the trigger was the
//! console `END` command, end of input, an interrupt signal, or a persistent
//! receiver fault.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::net;
use crate::registry::UnitRegistry;
use crate::service::{console, ConsoleBroadcaster, ProbePublisher, TelemetryReceiver};
use crate::stats::SessionStats;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Main-thread poll period while the session runs
const MAIN_POLL_PERIOD: Duration = Duration::from_millis(100);

/// How often session statistics are logged
const STATS_PERIOD: Duration = Duration::from_secs(10);

/// The historian session context shared by all worker loops
pub struct Historian {
    socket: Arc<UdpSocket>,
    broadcast_addr: SocketAddr,
    registry: Arc<UnitRegistry>,
    stats: Arc<SessionStats>,
    running: Arc<AtomicBool>,
}

impl Historian {
    /// Bind the shared socket and resolve the broadcast address
    pub fn new(config: &Config) -> Result<Self> {
        let socket = net::bind_broadcast_socket(config.network.port)?;
        let broadcast_addr = net::resolve_broadcast_addr(
            &config.network.interface,
            &config.network.fallback_broadcast,
            config.network.port,
        )?;

        log::info!("listening on 0.0.0.0:{}", config.network.port);
        log::info!("broadcast address: {}", broadcast_addr);

        Ok(Self {
            socket: Arc::new(socket),
            broadcast_addr,
            registry: Arc::new(UnitRegistry::new()),
            stats: Arc::new(SessionStats::new()),
            running: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Spawn the worker loops, wait for shutdown and join them all
    pub fn run(&mut self) -> Result<()> {
        let running = Arc::clone(&self.running);
        ctrlc::set_handler(move || {
            log::info!("interrupt received, shutting down");
            running.store(false, Ordering::Relaxed);
        })
        .map_err(|e| Error::Other(format!("failed to set signal handler: {}", e)))?;

        let receiver_handle = self.spawn_receiver()?;
        let keepalive_handle = self.spawn_keepalive()?;
        let console_handle = self.spawn_console()?;

        log::info!("historian running, listening for UTR(s)");

        let mut last_stats = Instant::now();
        while self.running.load(Ordering::Relaxed) {
            std::thread::sleep(MAIN_POLL_PERIOD);
            if last_stats.elapsed() >= STATS_PERIOD {
                log::info!("session: {}", self.stats.summary());
                last_stats = Instant::now();
            }
        }

        log::info!("waiting for worker loops to finish");
        for handle in [receiver_handle, keepalive_handle, console_handle] {
            if handle.join().is_err() {
                log::error!("worker thread panicked");
            }
        }

        log::info!("session: {}", self.stats.summary());
        log::info!("historian stopped");
        Ok(())
    }

    fn spawn_receiver(&self) -> Result<JoinHandle<()>> {
        let mut receiver = TelemetryReceiver::new(
            Arc::clone(&self.socket),
            Arc::clone(&self.registry),
            Arc::clone(&self.stats),
            Arc::clone(&self.running),
        );
        std::thread::Builder::new()
            .name("receiver".to_string())
            .spawn(move || {
                if let Err(e) = receiver.run() {
                    log::error!("receiver error: {}", e);
                }
            })
            .map_err(|e| Error::Other(format!("failed to spawn receiver: {}", e)))
    }

    fn spawn_keepalive(&self) -> Result<JoinHandle<()>> {
        let mut publisher = ProbePublisher::new(
            Arc::clone(&self.socket),
            self.broadcast_addr,
            Arc::clone(&self.stats),
            Arc::clone(&self.running),
        );
        std::thread::Builder::new()
            .name("keepalive".to_string())
            .spawn(move || {
                if let Err(e) = publisher.run() {
                    log::error!("keepalive error: {}", e);
                }
            })
            .map_err(|e| Error::Other(format!("failed to spawn keepalive: {}", e)))
    }

    fn spawn_console(&self) -> Result<JoinHandle<()>> {
        let line_rx = console::spawn_stdin_reader();
        let mut broadcaster = ConsoleBroadcaster::new(
            Arc::clone(&self.socket),
            self.broadcast_addr,
            Arc::clone(&self.stats),
            Arc::clone(&self.running),
            line_rx,
        );
        std::thread::Builder::new()
            .name("console".to_string())
            .spawn(move || {
                if let Err(e) = broadcaster.run() {
                    log::error!("console error: {}", e);
                }
            })
            .map_err(|e| Error::Other(format!("failed to spawn console: {}", e)))
    }
}
