//! Watch bookkeeping configuration
//!
//! ```toml
//! [watch]
//! sweep_on_session_close = true
//! sweep_interval_changes = 1024  # prune dropped watches every 1024 changes
//! ```

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Watch bookkeeping configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WatchConfig {
    /// Drop registrations of dropped [`crate::Watch`] handles whenever a
    /// session ends
    ///
    /// Default: true
    #[serde(default = "default_sweep_on_session_close")]
    pub sweep_on_session_close: bool,

    /// Number of committed changes between two sweeps of dropped
    /// [`crate::Watch`] registrations
    ///
    /// Must be at least 1.
    /// Default: 1024
    #[serde(default = "default_sweep_interval_changes")]
    pub sweep_interval_changes: u64,
}

fn default_sweep_on_session_close() -> bool {
    true
}

fn default_sweep_interval_changes() -> u64 {
    1024
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sweep_on_session_close: default_sweep_on_session_close(),
            sweep_interval_changes: default_sweep_interval_changes(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval_changes == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch sweep_interval_changes must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}
