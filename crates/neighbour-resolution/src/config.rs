//! Configuration file support for the neighbour resolution engine.
//!
//! Loads and validates configuration from TOML files. Missing files fall
//! back to defaults, so a switch without any neighbour configuration runs
//! ARP-only resolution at CONTROL priority.

use crate::error::{NeighbourError, Result};
use crate::packet::PacketPriority;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sonic/neighbour-resolution.toml";

/// Neighbour resolution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighbourConfig {
    /// Intercept IPv6 neighbour discovery in addition to ARP
    #[serde(default = "default_ndp_enabled")]
    pub ndp_enabled: bool,

    /// Priority used when requesting neighbour packets from the transport
    #[serde(default = "default_packet_priority")]
    pub packet_priority: u32,

    /// Log a warning when several handlers emit for the same message
    #[serde(default = "default_warn_on_duplicate_replies")]
    pub warn_on_duplicate_replies: bool,
}

fn default_ndp_enabled() -> bool {
    false
}

fn default_packet_priority() -> u32 {
    PacketPriority::CONTROL.value()
}

fn default_warn_on_duplicate_replies() -> bool {
    true
}

impl Default for NeighbourConfig {
    fn default() -> Self {
        Self {
            ndp_enabled: default_ndp_enabled(),
            packet_priority: default_packet_priority(),
            warn_on_duplicate_replies: default_warn_on_duplicate_replies(),
        }
    }
}

impl NeighbourConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => {
                let config: Self = toml::from_str(&content).map_err(|e| {
                    NeighbourError::Config(format!(
                        "Failed to parse config file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(NeighbourError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            NeighbourError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path.as_ref(), content)?;

        Ok(())
    }

    /// Priority as the transport expects it
    pub fn priority(&self) -> PacketPriority {
        PacketPriority::new(self.packet_priority)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.packet_priority == 0 || self.packet_priority > PacketPriority::MAX.value() {
            return Err(NeighbourError::Config(format!(
                "packet_priority must be 1-{}",
                PacketPriority::MAX.value()
            )));
        }

        Ok(())
    }
}
