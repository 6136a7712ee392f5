//! Transaction evaluator
//!
//! Checks run first, in order, against the store as it is. Operations then
//! apply in order, each seeing the effects of the ones before it. The first
//! failure rolls the store back to where it stood before the first operation
//! and is reported by its position in the combined check/operation sequence.

use bytes::Bytes;
use tracing::debug;

use super::NodeStore;
use super::SessionId;
use crate::path::ScopedKey;
use crate::TxnError;
use crate::TxnOpKind;
use crate::TxnOpResult;
use crate::Version;
use crate::VersionMatch;

/// A [`crate::Check`] with its key mapped into the store namespace.
#[derive(Debug, Clone)]
pub(crate) struct ScopedCheck {
    pub(crate) key: ScopedKey,
    pub(crate) version: Version,
}

/// A [`crate::TxnOp`] with its key mapped into the store namespace and its
/// lease resolved to an owning session.
#[derive(Debug, Clone)]
pub(crate) enum ScopedOp {
    Create {
        key: ScopedKey,
        value: Bytes,
        owner: Option<SessionId>,
    },
    Set {
        key: ScopedKey,
        value: Bytes,
    },
    Erase {
        key: ScopedKey,
        matching: VersionMatch,
    },
}

pub(crate) fn evaluate<S: NodeStore + ?Sized>(
    store: &mut S,
    checks: &[ScopedCheck],
    ops: Vec<ScopedOp>,
) -> std::result::Result<Vec<TxnOpResult>, TxnError> {
    for (index, check) in checks.iter().enumerate() {
        let current = store.version(check.key.full());
        if current != check.version {
            debug!(index, key = %check.key, %current, expected = %check.version, "txn check failed");
            return Err(TxnError { index });
        }
    }

    let savepoint = store.savepoint();
    let mut results = Vec::with_capacity(ops.len());

    for (j, op) in ops.into_iter().enumerate() {
        let applied = match op {
            ScopedOp::Create { key, value, owner } => store
                .create(&key, value, owner)
                .map(|version| (TxnOpKind::Create, version)),
            ScopedOp::Set { key, value } => store.set(&key, value).map(|version| (TxnOpKind::Set, version)),
            ScopedOp::Erase { key, matching } => store
                .erase(&key, matching)
                .map(|()| (TxnOpKind::Erase, Version::Absent)),
        };

        match applied {
            Ok((kind, version)) => results.push(TxnOpResult { kind, version }),
            Err(e) => {
                let index = checks.len() + j;
                debug!(index, error = %e, "txn operation failed, rolling back");
                store.rollback_to(savepoint);
                return Err(TxnError { index });
            }
        }
    }

    Ok(results)
}
