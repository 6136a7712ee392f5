//! Key and path grammar
//!
//! A *path* is a possibly empty sequence of segments; a *key* is a non-empty
//! one. Both serialize as `/seg1/seg2/...`, with the empty path serialized as
//! the empty string. Validation runs before any store sees a key.

mod key_space;
mod validation;

pub use key_space::*;
pub use validation::*;
