//! Configuration for the historian daemon
//!
//! Loads configuration from a TOML file with the minimal parameters needed to
//! run the station; built-in defaults apply when no file is present.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/historian.toml";

/// UDP port used when neither the config file nor the command line names one
pub const DEFAULT_PORT: u16 = 2000;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

/// Network configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// UDP port shared by all nodes on the telemetry network
    pub port: u16,
    /// Wireless interface whose IPv4 address seeds broadcast detection
    pub interface: String,
    /// Broadcast address used when interface detection fails
    pub fallback_broadcast: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` overrides it
    pub level: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for a field deployment
    pub fn field_defaults() -> Self {
        Self {
            network: NetworkConfig {
                port: DEFAULT_PORT,
                interface: "wlan0".to_string(),
                fallback_broadcast: "192.168.1.255".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::field_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::field_defaults();
        assert_eq!(config.network.port, 2000);
        assert_eq!(config.network.interface, "wlan0");
        assert_eq!(config.network.fallback_broadcast, "192.168.1.255");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_serialization() {
        let config = Config::field_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[network]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("port = 2000"));
        assert!(toml_string.contains("interface = \"wlan0\""));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[network]
port = 2710
interface = "wlp2s0"
fallback_broadcast = "10.0.0.255"

[logging]
level = "debug"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.network.port, 2710);
        assert_eq!(config.network.interface, "wlp2s0");
        assert_eq!(config.network.fallback_broadcast, "10.0.0.255");
        assert_eq!(config.logging.level, "debug");
    }
}
