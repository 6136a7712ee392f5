use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tracing::debug;
use tracing::warn;

use super::KvClient;
use crate::constants::MEM_SCHEME;
use crate::constants::SCHEME_SEPARATOR;
use crate::path::KeySpace;
use crate::KvConfig;
use crate::MemDriver;
use crate::Result;
use crate::UsageError;

/// Constructs clients for one connection scheme.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Driver: Send + Sync {
    /// Opens a new session against `address`, scoped to `key_space`.
    ///
    /// The key space is already validated; `address` is driver-specific and
    /// the driver reports a malformed one as a [`UsageError`].
    async fn connect(
        &self,
        address: &str,
        key_space: KeySpace,
    ) -> Result<Box<dyn KvClient>>;
}

/// Scheme name to driver table.
///
/// Registration is add-only: a scheme, once registered, keeps its driver for
/// the lifetime of the registry. Pass the registry to whoever opens clients.
///
/// ```rust,ignore
/// let registry = Registry::with_builtin(&KvConfig::default());
/// let client = registry.open("mem://local", "/app").await?;
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl fmt::Debug for Registry {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Registry")
            .field("schemes", &self.drivers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the in-memory backend under `mem`.
    pub fn with_builtin(config: &KvConfig) -> Self {
        let mut drivers: HashMap<String, Arc<dyn Driver>> = HashMap::new();
        drivers.insert(MEM_SCHEME.to_string(), Arc::new(MemDriver::new(config.clone())));
        Self { drivers }
    }

    /// Registers `driver` under `scheme`.
    ///
    /// # Errors
    /// [`UsageError`] if the scheme is malformed or already registered.
    pub fn register(
        &mut self,
        scheme: impl Into<String>,
        driver: Arc<dyn Driver>,
    ) -> Result<()> {
        let scheme = scheme.into();
        if scheme.is_empty() || scheme.contains(SCHEME_SEPARATOR) {
            return Err(UsageError::new("invalid scheme", scheme).into());
        }
        if self.drivers.contains_key(&scheme) {
            warn!(%scheme, "refusing to replace registered driver");
            return Err(UsageError::new("scheme already registered", scheme).into());
        }

        debug!(%scheme, "driver registered");
        self.drivers.insert(scheme, driver);
        Ok(())
    }

    pub fn is_registered(
        &self,
        scheme: &str,
    ) -> bool {
        self.drivers.contains_key(scheme)
    }

    /// Opens a client from a `scheme://address` connection string.
    ///
    /// # Errors
    /// - [`UsageError`] `"invalid URL"` if `url` has no `://`
    /// - [`UsageError`] `"unknown scheme"` if no driver is registered for it
    /// - [`UsageError`] `"invalid path"` if `prefix` is not a valid path
    /// - whatever the driver reports while connecting
    pub async fn open(
        &self,
        url: &str,
        prefix: &str,
    ) -> Result<Box<dyn KvClient>> {
        let (scheme, address) = url
            .split_once(SCHEME_SEPARATOR)
            .ok_or_else(|| UsageError::new("invalid URL", url))?;

        let driver = self
            .drivers
            .get(scheme)
            .ok_or_else(|| UsageError::new("unknown scheme", scheme))?;

        let key_space = KeySpace::new(prefix)?;

        debug!(%scheme, %address, %prefix, "opening client");
        driver.connect(address, key_space).await
    }
}
