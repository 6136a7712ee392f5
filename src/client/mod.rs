//! Client-facing contract
//!
//! - [`KvClient`] - the operations every backend implements
//! - [`Registry`] / [`Driver`] - construct clients from `scheme://address`
//! - [`Txn`] - checks-then-operations batches
//! - [`Watch`] - single-fire change notification
//! - [`Version`] / [`VersionMatch`] - typed replacements for the wire-level `0`
//!
//! # Basic Usage
//! ```no_run
//! use bytes::Bytes;
//! use d_kv::{KvConfig, Registry, Txn, Version};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let registry = Registry::with_builtin(&KvConfig::default());
//!     let client = registry.open("mem://local", "/app").await.unwrap();
//!
//!     let version = client.create("/config", Bytes::from("30s"), false).await.unwrap();
//!
//!     let results = client
//!         .commit(Txn::new().check("/config", version).set("/config", "60s"))
//!         .await
//!         .unwrap();
//!     assert!(results[0].version.raw() > version.raw());
//!
//!     client.close().await;
//! }
//! ```

mod kv_client;
mod registry;
mod txn;
mod types;
mod watch;

pub use kv_client::*;
pub use registry::*;
pub use txn::*;
pub use types::*;
pub use watch::Watch;
pub(crate) use watch::watch_pair;
pub(crate) use watch::WatchTrigger;
