//! Error hierarchy for the key-value contract
//!
//! Errors are split by who can act on them:
//! - [`UsageError`]: the request could never have succeeded (bad key, bad URL)
//! - [`OpError`]: a well-formed single operation lost against current state
//! - [`TxnError`]: a transaction stopped at a given check/operation index
//! - [`ConnectionError`]: the backend could not answer ("don't know")

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input detected before any backend interaction
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Single operation failed against current store state
    #[error(transparent)]
    Op(#[from] OpError),

    /// Transaction failed at a combined check/operation index
    #[error(transparent)]
    Txn(#[from] TxnError),

    /// Backend session or connectivity failure
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Configuration loading or validation failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the operation error kind, if this is one.
    pub fn op(&self) -> Option<OpError> {
        match self {
            Error::Op(e) => Some(*e),
            _ => None,
        }
    }

    /// Returns the failing transaction index, if this is a transaction error.
    pub fn txn_index(&self) -> Option<usize> {
        match self {
            Error::Txn(e) => Some(e.index),
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

/// This request could not possibly have succeeded.
///
/// Always carries the offending input for diagnostics. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{msg}: {arg:?}")]
pub struct UsageError {
    pub msg: &'static str,
    pub arg: String,
}

impl UsageError {
    pub(crate) fn new(
        msg: &'static str,
        arg: impl Into<String>,
    ) -> Self {
        Self {
            msg,
            arg: arg.into(),
        }
    }
}

/// A non-transaction operation that could have succeeded, but did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    #[error("no entry")]
    NoEntry,

    #[error("entry exists")]
    EntryExists,

    #[error("attempt to create a child of ephemeral node")]
    EphemeralParent,
}

/// Transaction failed on the check or operation at `index`.
///
/// Checks and operations share one index space, checks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("transaction failed on operation with index {index}")]
pub struct TxnError {
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The client session was closed or has expired
    #[error("Session closed")]
    SessionClosed,

    /// The backend could not be reached or gave no definite answer
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}
