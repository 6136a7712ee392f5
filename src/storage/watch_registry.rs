//! Watch registry
//!
//! Pending single-fire watches grouped by the key they observe. A data watch
//! fires on any change of its key's version; a children watch fires when an
//! immediate child of its key appears or disappears.
//!
//! Firing removes the whole group for a key: every registration is used up by
//! the first relevant change. Registrations whose [`crate::Watch`] was dropped
//! are pruned on the next registration for the same key and by [`sweep`].
//!
//! [`sweep`]: WatchRegistry::sweep

use dashmap::DashMap;
use tracing::trace;

use super::Change;
use crate::client::WatchTrigger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchKind {
    /// exists/get: fires on the key's version changing
    Data,
    /// children: fires on the key's child set changing
    Children,
}

#[derive(Debug, Default)]
pub(crate) struct WatchRegistry {
    data: DashMap<String, Vec<WatchTrigger>>,
    children: DashMap<String, Vec<WatchTrigger>>,
}

impl WatchRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn table(
        &self,
        kind: WatchKind,
    ) -> &DashMap<String, Vec<WatchTrigger>> {
        match kind {
            WatchKind::Data => &self.data,
            WatchKind::Children => &self.children,
        }
    }

    pub(crate) fn register(
        &self,
        kind: WatchKind,
        key: &str,
        trigger: WatchTrigger,
    ) {
        let mut triggers = self.table(kind).entry(key.to_string()).or_default();
        triggers.retain(|t| !t.is_abandoned());
        triggers.push(trigger);
        trace!(key, ?kind, pending = triggers.len(), "watch registered");
    }

    /// Fires and removes every watch of `kind` on `key`. Returns how many fired.
    pub(crate) fn fire(
        &self,
        kind: WatchKind,
        key: &str,
    ) -> usize {
        let Some((_, triggers)) = self.table(kind).remove(key) else {
            return 0;
        };
        let fired = triggers.len();
        for trigger in triggers {
            trigger.fire();
        }
        trace!(key, ?kind, fired, "watches fired");
        fired
    }

    /// Fires the watches satisfied by a batch of committed changes.
    pub(crate) fn apply(
        &self,
        changes: &[Change],
    ) {
        for change in changes {
            self.fire(WatchKind::Data, change.key());
            for parent in change.reshaped() {
                self.fire(WatchKind::Children, parent);
            }
        }
    }

    /// Drops registrations whose caller is gone. Returns how many were dropped.
    pub(crate) fn sweep(&self) -> usize {
        let mut dropped = 0;
        for table in [&self.data, &self.children] {
            table.retain(|_, triggers| {
                let before = triggers.len();
                triggers.retain(|t| !t.is_abandoned());
                dropped += before - triggers.len();
                !triggers.is_empty()
            });
        }
        if dropped > 0 {
            trace!(dropped, "abandoned watches swept");
        }
        dropped
    }

    /// Number of pending registrations.
    pub(crate) fn watcher_count(&self) -> usize {
        [&self.data, &self.children]
            .iter()
            .map(|table| table.iter().map(|e| e.value().len()).sum::<usize>())
            .sum()
    }

    pub(crate) fn watched_key_count(&self) -> usize {
        self.data.len() + self.children.len()
    }
}
