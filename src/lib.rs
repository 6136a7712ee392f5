//! # d-kv
//!
//! A versioned, hierarchical key-value contract with pluggable backends.
//!
//! Clients are opened from a `scheme://address` connection string and a key
//! prefix through a [`Registry`]. Every backend upholds the same semantics:
//! monotonically versioned entries in a `/`-separated namespace, atomic
//! check-then-apply transactions with positional failure reporting, and
//! single-fire watches.
//!
//! The in-memory backend is built in under the [`MEM_SCHEME`] scheme.

mod client;
mod config;
mod constants;
mod errors;
pub mod path;
mod storage;

pub use client::*;
pub use constants::MEM_SCHEME;
pub use errors::*;
pub use storage::*;

pub use self::config::*;
