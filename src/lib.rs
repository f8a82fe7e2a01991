//! Historian - control-station daemon for a small irrigation telemetry network
//!
//! This library provides the building blocks of the station: the wire
//! protocol, identifier registry, network setup and the three worker loops
//! (receiver, console, keepalive) that share one UDP broadcast socket.

pub mod app;
pub mod config;
pub mod error;
pub mod net;
pub mod protocol;
pub mod registry;
pub mod service;
pub mod stats;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
