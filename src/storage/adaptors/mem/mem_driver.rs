use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use super::MemClient;
use super::MemStore;
use crate::path::KeySpace;
use crate::Driver;
use crate::KvClient;
use crate::KvConfig;
use crate::Result;
use crate::UsageError;

/// Driver for `mem://<name>`.
///
/// Every distinct name is one [`MemStore`], created on first use and shared by
/// all later connections to it through this driver.
#[derive(Debug, Default)]
pub struct MemDriver {
    config: KvConfig,
    stores: DashMap<String, Arc<MemStore>>,
}

impl MemDriver {
    pub fn new(config: KvConfig) -> Self {
        Self {
            config,
            stores: DashMap::new(),
        }
    }

    /// The store named `name`, if any client ever connected to it.
    pub fn store(
        &self,
        name: &str,
    ) -> Option<Arc<MemStore>> {
        self.stores.get(name).map(|store| store.value().clone())
    }

    pub fn store_count(&self) -> usize {
        self.stores.len()
    }
}

#[async_trait]
impl Driver for MemDriver {
    async fn connect(
        &self,
        address: &str,
        key_space: KeySpace,
    ) -> Result<Box<dyn KvClient>> {
        if address.is_empty() {
            return Err(UsageError::new("invalid address", address).into());
        }

        let store = self
            .stores
            .entry(address.to_string())
            .or_insert_with(|| {
                info!(store = %address, "creating in-memory store");
                Arc::new(MemStore::new(address, self.config.watch.clone()))
            })
            .clone();

        Ok(Box::new(MemClient::new(
            store,
            key_space,
            self.config.session.expiry_delay(),
        )))
    }
}
