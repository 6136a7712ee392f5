//! NodeStore
//!
//! Mutation interface of a versioned entry tree, as seen by the transaction
//! evaluator. Every mutation is journaled so that a batch of them can be
//! undone back to a savepoint.

use bytes::Bytes;
#[cfg(test)]
use mockall::automock;

use super::SessionId;
use crate::path::ScopedKey;
use crate::OpError;
use crate::Version;
use crate::VersionMatch;

#[cfg_attr(test, automock)]
pub trait NodeStore {
    /// Current version of `key`, `Absent` if there is no entry.
    fn version(
        &self,
        key: &str,
    ) -> Version;

    /// Inserts a new entry. `owner` marks it leased by that session.
    fn create(
        &mut self,
        key: &ScopedKey,
        value: Bytes,
        owner: Option<SessionId>,
    ) -> std::result::Result<Version, OpError>;

    fn set(
        &mut self,
        key: &ScopedKey,
        value: Bytes,
    ) -> std::result::Result<Version, OpError>;

    fn erase(
        &mut self,
        key: &ScopedKey,
        matching: VersionMatch,
    ) -> std::result::Result<(), OpError>;

    /// Marks the current journal position.
    fn savepoint(&self) -> usize;

    /// Undoes every mutation made after `savepoint`, newest first.
    fn rollback_to(
        &mut self,
        savepoint: usize,
    );
}
