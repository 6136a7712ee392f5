//! Storage side of the contract: the versioned entry tree, the transaction
//! evaluator over it, watch bookkeeping and the backends built from them.

mod adaptors;
mod node_store;
mod session;
mod tree;
mod txn;
mod watch_registry;

pub use adaptors::*;
pub(crate) use node_store::*;
pub use session::*;
pub(crate) use tree::*;
pub(crate) use txn::*;
pub(crate) use watch_registry::*;
