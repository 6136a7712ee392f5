//! KV client trait - the contract every backend driver upholds.
//!
//! A client is one session against a backend, bound to a key prefix. All keys
//! passed in are validated with [`crate::path::disassemble_key`] before the
//! backend is touched; a malformed key fails with [`crate::UsageError`].
//!
//! # Example
//!
//! ```rust,ignore
//! async fn create_if_missing(client: &dyn KvClient) -> Result<Version> {
//!     match client.create("/config", Bytes::from_static(b"30s"), false).await {
//!         Err(Error::Op(OpError::EntryExists)) => Ok(client.exists("/config", false).await?.0),
//!         other => other,
//!     }
//! }
//! ```

use async_trait::async_trait;
use bytes::Bytes;

use super::Entry;
use super::Txn;
use super::TxnOpResult;
use super::Version;
use super::VersionMatch;
use super::Watch;
use crate::Result;

/// Unified versioned, hierarchical key-value interface.
///
/// # Errors
///
/// Every method may fail with:
/// - [`crate::Error::Usage`] for a malformed key
/// - [`crate::Error::Connection`] when the backend can not give a definite answer
///
/// Method-specific operation errors are listed on each method.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a backend serves concurrent callers
/// as if operations on one key were serialized.
#[async_trait]
pub trait KvClient: Send + Sync {
    /// Creates `key` with `value`. A leased entry is erased when this client's
    /// session ends.
    ///
    /// # Errors
    /// - [`crate::OpError::EntryExists`] if `key` exists
    /// - [`crate::OpError::NoEntry`] if the parent key does not exist
    /// - [`crate::OpError::EphemeralParent`] if the parent key is leased
    async fn create(
        &self,
        key: &str,
        value: Bytes,
        lease: bool,
    ) -> Result<Version>;

    /// Replaces the value of an existing entry.
    ///
    /// # Errors
    /// - [`crate::OpError::NoEntry`] if `key` does not exist
    async fn set(
        &self,
        key: &str,
        value: Bytes,
    ) -> Result<Version>;

    /// Compare-and-swap.
    ///
    /// - `expected == Absent`: creates `key` if it does not exist, otherwise
    ///   returns [`Version::Absent`] and changes nothing.
    /// - `expected == At(v)`: replaces the value if the current version is `v`,
    ///   otherwise returns [`Version::Absent`] and changes nothing.
    ///
    /// # Errors
    /// - [`crate::OpError::NoEntry`] if `expected` is a version and `key` does not exist
    /// - create's parent errors when `expected` is `Absent`
    async fn cas(
        &self,
        key: &str,
        value: Bytes,
        expected: Version,
    ) -> Result<Version>;

    /// Erases `key` if its version satisfies `matching`. A version mismatch is
    /// a silent no-op. Descendants are left in place.
    ///
    /// # Errors
    /// - [`crate::OpError::NoEntry`] if `key` does not exist
    async fn erase(
        &self,
        key: &str,
        matching: VersionMatch,
    ) -> Result<()>;

    /// Current version of `key`, [`Version::Absent`] if it does not exist.
    ///
    /// With `watch`, the returned handle fires on the next change of the
    /// version, including creation and erasure.
    async fn exists(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Version, Option<Watch>)>;

    /// Version and value of `key`.
    ///
    /// # Errors
    /// - [`crate::OpError::NoEntry`] if `key` does not exist
    async fn get(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Entry, Option<Watch>)>;

    /// Immediate children of `key`, as full keys. `key` itself need not be an
    /// entry. With `watch`, the handle fires when a child is added or removed.
    ///
    /// # Errors
    /// - [`crate::OpError::NoEntry`] if `key` has neither an entry nor descendants
    async fn children(
        &self,
        key: &str,
        watch: bool,
    ) -> Result<(Vec<String>, Option<Watch>)>;

    /// Commits a transaction atomically.
    ///
    /// # Errors
    /// - [`crate::TxnError`] with the index of the first failing check, or
    ///   `checks.len() + j` for the first failing operation `j`
    async fn commit(
        &self,
        txn: Txn,
    ) -> Result<Vec<TxnOpResult>>;

    /// Ends the session. Leased entries created by it are eventually erased;
    /// later calls fail with [`crate::ConnectionError::SessionClosed`].
    async fn close(&self);
}
