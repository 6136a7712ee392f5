//! Versioned entry tree
//!
//! Entries live in a flat ordered map keyed by their full key. Ancestors are
//! purely structural: a key has children as long as some entry lies below it,
//! whether or not the key itself is an entry. Creating or erasing one entry
//! can therefore add or remove a path several levels up.
//!
//! Versions are drawn from one counter for the whole tree, so a key that is
//! erased and created again never sees a version it had before.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::num::NonZeroU64;

use bytes::Bytes;
use tracing::trace;

use super::NodeStore;
use super::SessionId;
use crate::constants::SEGMENT_SEPARATOR;
use crate::path::ScopedKey;
use crate::Entry;
use crate::OpError;
use crate::Version;
use crate::VersionMatch;

#[derive(Debug, Clone)]
struct Node {
    version: NonZeroU64,
    value: Bytes,
    /// Session that leased this entry, `None` for persistent entries
    owner: Option<SessionId>,
}

#[derive(Debug, Clone)]
enum ChangeKind {
    Created,
    Updated(Node),
    Erased(Node),
}

/// One journaled mutation.
#[derive(Debug, Clone)]
pub(crate) struct Change {
    key: String,
    kind: ChangeKind,
    /// Paths whose set of immediate children changed, nearest first
    reshaped: Vec<String>,
}

impl Change {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn reshaped(&self) -> &[String] {
        &self.reshaped
    }
}

fn parent_of(key: &str) -> &str {
    key.rsplit_once(SEGMENT_SEPARATOR).map_or("", |(parent, _)| parent)
}

/// `key` followed by each of its ancestors, root excluded.
fn lineage(key: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(key), |k| Some(parent_of(*k))).take_while(|k| !k.is_empty())
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: BTreeMap<String, Node>,
    next_version: NonZeroU64,
    journal: Vec<Change>,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_version: NonZeroU64::MIN,
            journal: Vec::new(),
        }
    }
}

impl Tree {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn get(
        &self,
        key: &str,
    ) -> Option<Entry> {
        self.nodes.get(key).map(|node| Entry {
            version: Version::At(node.version),
            value: node.value.clone(),
        })
    }

    /// Full keys of the immediate children of `key`, sorted.
    ///
    /// `None` if `key` is unknown: neither an entry nor an ancestor of one.
    pub(crate) fn children(
        &self,
        key: &str,
    ) -> Option<Vec<String>> {
        let lower = format!("{key}{SEGMENT_SEPARATOR}");
        let mut children = BTreeSet::new();

        for full in self.nodes.range(lower.clone()..).map(|(k, _)| k) {
            let Some(rest) = full.strip_prefix(lower.as_str()) else {
                break;
            };
            let child = match rest.find(SEGMENT_SEPARATOR) {
                Some(idx) => &full[..lower.len() + idx],
                None => full.as_str(),
            };
            children.insert(child.to_string());
        }

        if children.is_empty() && !self.nodes.contains_key(key) {
            return None;
        }
        Some(children.into_iter().collect())
    }

    /// Whether `key` shows up in its parent's children.
    fn is_known(
        &self,
        key: &str,
    ) -> bool {
        self.nodes.contains_key(key) || self.has_descendants(key)
    }

    /// Presence of `key` and each of its ancestors, for [`Tree::reshaped_since`].
    fn presence(
        &self,
        key: &str,
    ) -> Vec<bool> {
        lineage(key).map(|k| self.is_known(k)).collect()
    }

    /// Parents whose child set changed since `before` was taken. A path
    /// appearing or vanishing reshapes its parent; the walk stops at the first
    /// path whose presence held.
    fn reshaped_since(
        &self,
        key: &str,
        before: &[bool],
    ) -> Vec<String> {
        lineage(key)
            .zip(before)
            .take_while(|(k, was)| self.is_known(k) != **was)
            .map(|(k, _)| parent_of(k).to_string())
            .collect()
    }

    fn has_descendants(
        &self,
        key: &str,
    ) -> bool {
        let lower = format!("{key}{SEGMENT_SEPARATOR}");
        self.nodes
            .range(lower.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(lower.as_str()))
    }

    fn allocate_version(&mut self) -> NonZeroU64 {
        let version = self.next_version;
        self.next_version = version.saturating_add(1);
        version
    }

    /// Compare-and-swap, see [`crate::KvClient::cas`].
    pub(crate) fn cas(
        &mut self,
        key: &ScopedKey,
        value: Bytes,
        expected: Version,
    ) -> std::result::Result<Version, OpError> {
        let current = self.version(key.full());
        match expected {
            Version::Absent if current.exists() => Ok(Version::Absent),
            Version::Absent => self.create(key, value, None),
            Version::At(_) if current.is_absent() => Err(OpError::NoEntry),
            Version::At(_) if current != expected => Ok(Version::Absent),
            Version::At(_) => self.set(key, value),
        }
    }

    /// Erases every entry leased by `owner`. Returns how many were erased.
    pub(crate) fn expire(
        &mut self,
        owner: &SessionId,
    ) -> usize {
        let leased: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.owner.as_ref() == Some(owner))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &leased {
            let before = self.presence(key);
            if let Some(prev) = self.nodes.remove(key) {
                let reshaped = self.reshaped_since(key, &before);
                self.record(key, ChangeKind::Erased(prev), reshaped);
            }
        }
        leased.len()
    }

    /// Hands out every journaled change, ending the current undo scope.
    pub(crate) fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.journal)
    }

    fn record(
        &mut self,
        key: &str,
        kind: ChangeKind,
        reshaped: Vec<String>,
    ) {
        trace!(key, ?kind, ?reshaped, "tree change");
        self.journal.push(Change {
            key: key.to_string(),
            kind,
            reshaped,
        });
    }
}

impl NodeStore for Tree {
    fn version(
        &self,
        key: &str,
    ) -> Version {
        self.nodes
            .get(key)
            .map_or(Version::Absent, |node| Version::At(node.version))
    }

    fn create(
        &mut self,
        key: &ScopedKey,
        value: Bytes,
        owner: Option<SessionId>,
    ) -> std::result::Result<Version, OpError> {
        if self.nodes.contains_key(key.full()) {
            return Err(OpError::EntryExists);
        }
        if let Some(parent) = key.parent() {
            match self.nodes.get(parent) {
                None => return Err(OpError::NoEntry),
                Some(node) if node.owner.is_some() => return Err(OpError::EphemeralParent),
                Some(_) => {}
            }
        }

        let version = self.allocate_version();
        let before = self.presence(key.full());
        self.nodes.insert(
            key.full().to_string(),
            Node {
                version,
                value,
                owner,
            },
        );
        let reshaped = self.reshaped_since(key.full(), &before);
        self.record(key.full(), ChangeKind::Created, reshaped);
        Ok(Version::At(version))
    }

    fn set(
        &mut self,
        key: &ScopedKey,
        value: Bytes,
    ) -> std::result::Result<Version, OpError> {
        if !self.nodes.contains_key(key.full()) {
            return Err(OpError::NoEntry);
        }

        let version = self.allocate_version();
        let Some(node) = self.nodes.get_mut(key.full()) else {
            return Err(OpError::NoEntry);
        };
        let prev = node.clone();
        node.version = version;
        node.value = value;

        self.record(key.full(), ChangeKind::Updated(prev), Vec::new());
        Ok(Version::At(version))
    }

    fn erase(
        &mut self,
        key: &ScopedKey,
        matching: VersionMatch,
    ) -> std::result::Result<(), OpError> {
        let current = match self.nodes.get(key.full()) {
            None => return Err(OpError::NoEntry),
            Some(node) => node.version,
        };
        if !matching.matches(current) {
            trace!(key = %key, %current, expected = matching.raw(), "erase skipped on version mismatch");
            return Ok(());
        }

        let before = self.presence(key.full());
        if let Some(prev) = self.nodes.remove(key.full()) {
            let reshaped = self.reshaped_since(key.full(), &before);
            self.record(key.full(), ChangeKind::Erased(prev), reshaped);
        }
        Ok(())
    }

    fn savepoint(&self) -> usize {
        self.journal.len()
    }

    fn rollback_to(
        &mut self,
        savepoint: usize,
    ) {
        while self.journal.len() > savepoint {
            let Some(change) = self.journal.pop() else {
                break;
            };
            match change.kind {
                ChangeKind::Created => {
                    self.nodes.remove(&change.key);
                }
                ChangeKind::Updated(prev) | ChangeKind::Erased(prev) => {
                    self.nodes.insert(change.key, prev);
                }
            }
        }
    }
}
