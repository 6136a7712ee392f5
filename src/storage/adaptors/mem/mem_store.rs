//! Shared in-process store behind every `mem://<name>` client of that name.
//!
//! One [`Tree`] under a reader-writer lock plus the pending watches. Every
//! mutation drains the tree's journal and fires the satisfied watches before
//! the write lock is released, so a watch always fires before the mutation's
//! success is reported. Registration happens under the read lock that served
//! the observed state, so no mutation can slip in between the two.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::debug;
use tracing::trace;

use crate::client::watch_pair;
use crate::path::ScopedKey;
use crate::storage::evaluate;
use crate::storage::NodeStore;
use crate::storage::ScopedCheck;
use crate::storage::ScopedOp;
use crate::storage::SessionId;
use crate::storage::Tree;
use crate::storage::WatchKind;
use crate::storage::WatchRegistry;
use crate::Entry;
use crate::OpError;
use crate::TxnError;
use crate::TxnOpResult;
use crate::Version;
use crate::VersionMatch;
use crate::Watch;
use crate::WatchConfig;

#[derive(Debug)]
pub struct MemStore {
    name: String,
    tree: RwLock<Tree>,
    watches: WatchRegistry,
    /// Changes committed since dropped watches were last swept
    unswept: AtomicU64,
    config: WatchConfig,
}

impl MemStore {
    pub(crate) fn new(
        name: &str,
        config: WatchConfig,
    ) -> Self {
        Self {
            name: name.to_string(),
            tree: RwLock::new(Tree::new()),
            watches: WatchRegistry::new(),
            unswept: AtomicU64::new(0),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of watch registrations not yet fired.
    pub fn pending_watches(&self) -> usize {
        self.watches.watcher_count()
    }

    fn watch_if(
        &self,
        watch: bool,
        kind: WatchKind,
        key: &str,
    ) -> Option<Watch> {
        if !watch {
            return None;
        }
        let (trigger, handle) = watch_pair();
        self.watches.register(kind, key, trigger);
        Some(handle)
    }

    pub(crate) fn exists(
        &self,
        key: &ScopedKey,
        watch: bool,
    ) -> (Version, Option<Watch>) {
        let tree = self.tree.read();
        let version = tree.version(key.full());
        let handle = self.watch_if(watch, WatchKind::Data, key.full());
        drop(tree);
        (version, handle)
    }

    pub(crate) fn get(
        &self,
        key: &ScopedKey,
        watch: bool,
    ) -> std::result::Result<(Entry, Option<Watch>), OpError> {
        let tree = self.tree.read();
        let entry = tree.get(key.full()).ok_or(OpError::NoEntry)?;
        let handle = self.watch_if(watch, WatchKind::Data, key.full());
        drop(tree);
        Ok((entry, handle))
    }

    /// Immediate children as full store keys.
    pub(crate) fn children(
        &self,
        key: &ScopedKey,
        watch: bool,
    ) -> std::result::Result<(Vec<String>, Option<Watch>), OpError> {
        let tree = self.tree.read();
        let children = tree.children(key.full()).ok_or(OpError::NoEntry)?;
        let handle = self.watch_if(watch, WatchKind::Children, key.full());
        drop(tree);
        Ok((children, handle))
    }

    pub(crate) fn create(
        &self,
        key: &ScopedKey,
        value: Bytes,
        owner: Option<SessionId>,
    ) -> std::result::Result<Version, OpError> {
        self.mutate(|tree| tree.create(key, value, owner))
    }

    pub(crate) fn set(
        &self,
        key: &ScopedKey,
        value: Bytes,
    ) -> std::result::Result<Version, OpError> {
        self.mutate(|tree| tree.set(key, value))
    }

    pub(crate) fn cas(
        &self,
        key: &ScopedKey,
        value: Bytes,
        expected: Version,
    ) -> std::result::Result<Version, OpError> {
        self.mutate(|tree| tree.cas(key, value, expected))
    }

    pub(crate) fn erase(
        &self,
        key: &ScopedKey,
        matching: VersionMatch,
    ) -> std::result::Result<(), OpError> {
        self.mutate(|tree| tree.erase(key, matching))
    }

    pub(crate) fn commit(
        &self,
        checks: &[ScopedCheck],
        ops: Vec<ScopedOp>,
    ) -> std::result::Result<Vec<TxnOpResult>, TxnError> {
        self.mutate(|tree| evaluate(tree, checks, ops))
    }

    /// Erases every entry leased by `session`.
    pub(crate) fn expire_session(
        &self,
        session: &SessionId,
    ) -> usize {
        let erased = self.mutate(|tree| tree.expire(session));
        let swept = if self.config.sweep_on_session_close {
            self.watches.sweep()
        } else {
            0
        };
        debug!(
            store = %self.name,
            %session,
            erased,
            swept,
            watched_keys = self.watches.watched_key_count(),
            "session expired"
        );
        erased
    }

    /// Sweeps dropped watches once `sweep_interval_changes` changes piled up.
    /// Called under the write lock.
    fn sweep_if_due(
        &self,
        committed: u64,
    ) {
        let unswept = self.unswept.fetch_add(committed, Ordering::Relaxed) + committed;
        if unswept < self.config.sweep_interval_changes {
            return;
        }
        self.unswept.store(0, Ordering::Relaxed);
        let swept = self.watches.sweep();
        trace!(store = %self.name, unswept, swept, "periodic watch sweep");
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Tree) -> T,
    ) -> T {
        let mut tree = self.tree.write();
        let outcome = f(&mut *tree);
        let changes = tree.drain_changes();
        if !changes.is_empty() {
            trace!(store = %self.name, changes = changes.len(), "applying watches");
            self.watches.apply(&changes);
            self.sweep_if_due(changes.len() as u64);
        }
        outcome
    }
}
