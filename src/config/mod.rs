//! Configuration for the key-value client and its in-memory backend.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support
//! - Environment variable overrides
mod session;
mod watch;

use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;
pub use session::*;
pub use watch::*;

use crate::constants::CONFIG_ENV_PREFIX;
use crate::constants::CONFIG_PATH_ENV;
use crate::Result;


/// Configuration shared by every client a [`crate::Registry`] opens
///
/// Sources, later overriding earlier:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables prefixed `DKV__` (highest priority)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct KvConfig {
    /// Session lifecycle
    #[serde(default)]
    pub session: SessionConfig,
    /// Watch bookkeeping
    #[serde(default)]
    pub watch: WatchConfig,
}

impl KvConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` before using the result.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("DKV__SESSION__EXPIRY_DELAY_MS", "500");
    /// let cfg = KvConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(Self::environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies overrides from the file at `path`, then the environment again.
    ///
    /// Does NOT validate.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.session.validate()?;
        self.watch.validate()?;
        Ok(self)
    }

    fn environment() -> Environment {
        Environment::with_prefix(CONFIG_ENV_PREFIX)
            .separator("__")
            .ignore_empty(true)
            .try_parsing(true)
    }
}
