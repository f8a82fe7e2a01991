//! Historian daemon entry point
//!
//! Control station for a small irrigation telemetry network:
//!
//! - **UDP broadcast (default port 2000)**: units announce themselves with
//!   `NEW UTR` and report status with `UTR #...`; the station replies to
//!   registrations with a unicast `ASSIGNED UTR #<n>` and broadcasts a
//!   `HELLO?` liveness probe every 2 seconds.
//! - **Console**: every line typed is broadcast to the network verbatim;
//!   the literal line `END` shuts the station down.

use historian::app::Historian;
use historian::config::{Config, DEFAULT_CONFIG_PATH};
use std::env;
use std::path::Path;

/// Command-line arguments
///
/// Supports:
/// - `historian <port>` (positional)
/// - `historian --config <path>` / `historian -c <path>`
#[derive(Debug, Default)]
struct CliArgs {
    config_path: Option<String>,
    port: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = env::args().collect();
    let mut parsed = CliArgs::default();

    let mut i = 1;
    while i < args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            parsed.config_path = Some(args[i + 1].clone());
            i += 2;
        } else if !args[i].starts_with('-') && parsed.port.is_none() {
            parsed.port = Some(args[i].clone());
            i += 1;
        } else {
            i += 1;
        }
    }

    parsed
}

fn load_config(args: &CliArgs) -> historian::Result<Config> {
    match &args.config_path {
        Some(path) => Config::from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Config::from_file(DEFAULT_CONFIG_PATH),
        None => Ok(Config::field_defaults()),
    }
}

fn main() -> historian::Result<()> {
    let args = parse_args();
    let mut config = load_config(&args)?;

    // Initialize logger; RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Historian v{} starting...", env!("CARGO_PKG_VERSION"));

    // Positional port overrides the configured one; non-numeric text is
    // ignored with a warning so the station still comes up.
    if let Some(raw) = &args.port {
        match raw.parse::<u16>() {
            Ok(port) => config.network.port = port,
            Err(_) => log::warn!(
                "ignoring non-numeric port argument {:?}, using port {}",
                raw,
                config.network.port
            ),
        }
    }
    log::info!("using UDP port {}", config.network.port);

    let mut historian = Historian::new(&config)?;
    historian.run()
}
