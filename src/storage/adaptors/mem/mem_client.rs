use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use tracing::trace;

use super::MemStore;
use crate::path::KeySpace;
use crate::path::ScopedKey;
use crate::storage::ScopedCheck;
use crate::storage::ScopedOp;
use crate::storage::SessionId;
use crate::ConnectionError;
use crate::Entry;
use crate::KvClient;
use crate::Result;
use crate::Txn;
use crate::TxnOp;
use crate::TxnOpResult;
use crate::Version;
use crate::VersionMatch;
use crate::Watch;

/// One session against a [`MemStore`].
///
/// Leased entries created through this client are erased when the session
/// ends: after the configured delay on [`KvClient::close`], or immediately
/// when the client is dropped without being closed.
#[derive(Debug)]
pub struct MemClient {
    store: Arc<MemStore>,
    key_space: KeySpace,
    session: SessionId,
    expiry_delay: Duration,
    closed: AtomicBool,
}

impl MemClient {
    pub(crate) fn new(
        store: Arc<MemStore>,
        key_space: KeySpace,
        expiry_delay: Duration,
    ) -> Self {
        let session = SessionId::generate();
        debug!(store = %store.name(), %session, prefix = %key_space.prefix(), "session opened");
        Self {
            store,
            key_space,
            session,
            expiry_delay,
            closed: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn store(&self) -> &Arc<MemStore> {
        &self.store
    }

    /// Validates `key` and checks the session is still open, in that order.
    fn scoped(
        &self,
        key: &str,
    ) -> Result<ScopedKey> {
        let key = self.key_space.scope(key)?;
        self.ensure_open()?;
        Ok(key)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ConnectionError::SessionClosed.into());
        }
        Ok(())
    }

    fn scope_txn(
        &self,
        txn: Txn,
    ) -> Result<(Vec<ScopedCheck>, Vec<ScopedOp>)> {
        let checks = txn
            .checks
            .into_iter()
            .map(|check| -> Result<ScopedCheck> {
                Ok(ScopedCheck {
                    key: self.key_space.scope(&check.key)?,
                    version: check.version,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let ops = txn
            .ops
            .into_iter()
            .map(|op| -> Result<ScopedOp> {
                Ok(match op {
                    TxnOp::Create { key, value, lease } => ScopedOp::Create {
                        key: self.key_space.scope(&key)?,
                        value,
                        owner: lease.then(|| self.session.clone()),
                    },
                    TxnOp::Set { key, value } => ScopedOp::Set {
                        key: self.key_space.scope(&key)?,
                        value,
                    },
                    TxnOp::Erase { key, matching } => ScopedOp::Erase {
                        key: self.key_space.scope(&key)?,
                        matching,
                    },
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((checks, ops))
    }
}

#[async_trait]
impl KvClient for MemClient {
    async fn create(
        &self,
        key: &str,
        value: Bytes,
        lease: bool,
    ) -> Result<Version> {
        let key = self.scoped(key)?;
        let owner = lease.then(|| self.session.clone());
        Ok(self.store.create(&key, value, owner)?)
    }

    async fn set(
        &self,
        key: &str,
        value: Bytes,
    ) -> Result<Version> {
        let key = self.scoped(key)?;
        Ok(self.store.set(&key, value)?)
    }

    async fn cas(
        &self,
        key: &str,
        value: Bytes,
        expected: Version,
    ) -> Result<Version> {
        let key = self.scoped(key)?;
        Ok(self.store.cas(&key, value, expected)?)
    }

    async fn erase(
        &self,
        key: &str,
        matching: VersionMatch,
    ) -> Result<()> {
        let key = self.scoped(key)?;
        Ok(self.store.erase(&key, matching)?)
    }

    async fn exists(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Version, Option<Watch>)> {
        let key = self.scoped(key)?;
        Ok(self.store.exists(&key, watch))
    }

    async fn get(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Entry, Option<Watch>)> {
        let key = self.scoped(key)?;
        Ok(self.store.get(&key, watch)?)
    }

    async fn children(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Vec<String>, Option<Watch>)> {
        let key = self.scoped(key)?;
        let (children, handle) = self.store.children(&key, watch)?;
        let children = children
            .iter()
            .filter_map(|full| self.key_space.unscope(full))
            .map(str::to_string)
            .collect();
        Ok((children, handle))
    }

    async fn commit(
        &self,
        txn: Txn,
    ) -> Result<Vec<TxnOpResult>> {
        let (checks, ops) = self.scope_txn(txn)?;
        self.ensure_open()?;
        Ok(self.store.commit(&checks, ops)?)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        if self.expiry_delay.is_zero() {
            self.store.expire_session(&self.session);
            return;
        }

        trace!(session = %self.session, delay_ms = self.expiry_delay.as_millis() as u64, "session expiry scheduled");
        let store = self.store.clone();
        let session = self.session.clone();
        let delay = self.expiry_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.expire_session(&session);
        });
    }
}

impl Drop for MemClient {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.store.expire_session(&self.session);
        }
    }
}
