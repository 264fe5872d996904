//! The adapter: connection lifecycle, collection registry and CRUD executor.

mod builder;
mod config;
mod executor;
mod latch;
mod lifecycle;
mod nedb_adapter;
mod options;
mod registry;

pub use builder::*;
pub use config::*;
pub use lifecycle::*;
pub use nedb_adapter::*;
pub use options::*;
pub use registry::*;
