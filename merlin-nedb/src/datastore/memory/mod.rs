mod config;
mod index;
mod matcher;
mod modifier;
mod store;

pub use config::*;
pub use store::*;
