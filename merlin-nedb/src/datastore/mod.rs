//! Storage engine contract and the default in-memory engine.
//!
//! A [Datastore] is the handle of one collection's embedded document store.
//! It speaks the native dialect: filters, deltas and sort weights produced
//! by [crate::translate].

mod cursor;
mod factory;
mod memory;
mod options;
mod provider;

pub use cursor::*;
pub use factory::*;
pub use memory::*;
pub use options::*;
pub use provider::*;
