//! In-memory reference backend, registered under the `mem` scheme.

mod mem_client;
mod mem_driver;
mod mem_store;

pub use mem_client::*;
pub use mem_driver::*;
pub use mem_store::*;
