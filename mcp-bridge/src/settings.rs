//! Bridge settings
//!
//! Connection parameters only. Key bindings and the dataref table are part
//! of the panel layout and are not configurable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use mcp_relay::RelayConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Serial port the panel is attached to
    pub serial_port: String,
    /// Panel baud rate
    pub baud_rate: u32,
    /// Serial read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// X-Plane address (host:port)
    pub simulator_addr: SocketAddr,
    /// Local UDP bind address
    pub bind_addr: SocketAddr,
    /// Query button wait in milliseconds (0 = wait forever)
    pub query_timeout_ms: u64,
    /// Delay between the double-press switch presses in milliseconds
    pub double_press_delay_ms: u64,
    /// Log key presses instead of sending them
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_port: "COM3".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 100,
            simulator_addr: SocketAddr::from(([192, 168, 50, 250], 49000)),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 0)),
            query_timeout_ms: 2000,
            double_press_delay_ms: 2000,
            dry_run: false,
        }
    }
}

impl Settings {
    /// Get the XDG config directory for b737-mcp
    /// Uses $XDG_CONFIG_HOME/b737-mcp on Linux/macOS, falls back to ~/.config/b737-mcp
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("b737-mcp"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("b737-mcp"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(s) => Self::from_json(&s).unwrap_or_else(|e| {
                warn!("Ignoring invalid settings in {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serial read timeout
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Relay configuration derived from these settings
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            double_press_delay: Duration::from_millis(self.double_press_delay_ms),
            query_timeout: (self.query_timeout_ms > 0)
                .then(|| Duration::from_millis(self.query_timeout_ms)),
            ..Default::default()
        }
    }
}
