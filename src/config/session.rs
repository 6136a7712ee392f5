//! Session lifecycle configuration
//!
//! ```toml
//! [session]
//! expiry_delay_ms = 500  # reap leased entries half a second after close
//! ```

use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Upper bound for [`SessionConfig::expiry_delay_ms`]: one hour
pub const MAX_EXPIRY_DELAY_MS: u64 = 3_600_000;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Delay between a session closing and its leased entries being erased
    ///
    /// Mirrors the session timeout of a coordination service: other clients
    /// keep seeing the leased entries for this long after the owner closed.
    ///
    /// Range: 0-3600000
    /// Default: 0 (erase on close)
    #[serde(default)]
    pub expiry_delay_ms: u64,
}

impl SessionConfig {
    pub fn expiry_delay(&self) -> Duration {
        Duration::from_millis(self.expiry_delay_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.expiry_delay_ms > MAX_EXPIRY_DELAY_MS {
            return Err(Error::Config(ConfigError::Message(format!(
                "session expiry_delay_ms must be between 0 and {}, got {}",
                MAX_EXPIRY_DELAY_MS, self.expiry_delay_ms
            ))));
        }
        Ok(())
    }
}
