use bytes::Bytes;

use super::Version;
use super::VersionMatch;

/// Precondition of a transaction: `key` must currently be at `version`.
///
/// [`Version::Absent`] requires the entry not to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub key: String,
    pub version: Version,
}

/// A mutation applied by a transaction once all checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnOp {
    Create {
        key: String,
        value: Bytes,
        lease: bool,
    },
    Set {
        key: String,
        value: Bytes,
    },
    Erase {
        key: String,
        matching: VersionMatch,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxnOpKind {
    Create,
    Set,
    Erase,
}

/// Outcome of one applied operation.
///
/// `version` is the entry's new version; erase always reports
/// [`Version::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxnOpResult {
    pub kind: TxnOpKind,
    pub version: Version,
}

/// Ordered checks followed by ordered operations, committed atomically.
///
/// # Example
/// ```rust,ignore
/// let txn = Txn::new()
///     .check("/foo", ver)
///     .create("/foo/child", "value", false)
///     .erase("/foo/bar");
/// let results = client.commit(txn).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Txn {
    pub checks: Vec<Check>,
    pub ops: Vec<TxnOp>,
}

impl TxnOp {
    pub fn kind(&self) -> TxnOpKind {
        match self {
            TxnOp::Create { .. } => TxnOpKind::Create,
            TxnOp::Set { .. } => TxnOpKind::Set,
            TxnOp::Erase { .. } => TxnOpKind::Erase,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TxnOp::Create { key, .. } | TxnOp::Set { key, .. } | TxnOp::Erase { key, .. } => key,
        }
    }
}

impl Txn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(
        mut self,
        key: impl Into<String>,
        version: impl Into<Version>,
    ) -> Self {
        self.checks.push(Check {
            key: key.into(),
            version: version.into(),
        });
        self
    }

    pub fn create(
        mut self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
        lease: bool,
    ) -> Self {
        self.ops.push(TxnOp::Create {
            key: key.into(),
            value: value.into(),
            lease,
        });
        self
    }

    pub fn set(
        mut self,
        key: impl Into<String>,
        value: impl Into<Bytes>,
    ) -> Self {
        self.ops.push(TxnOp::Set {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Erases `key` whatever its current version.
    pub fn erase(
        self,
        key: impl Into<String>,
    ) -> Self {
        self.erase_matching(key, VersionMatch::Any)
    }

    pub fn erase_matching(
        mut self,
        key: impl Into<String>,
        matching: VersionMatch,
    ) -> Self {
        self.ops.push(TxnOp::Erase {
            key: key.into(),
            matching,
        });
        self
    }
}
