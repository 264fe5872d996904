//! Sink and source contracts the executor streams through.

mod collector;
mod sink;
mod source;

pub use collector::*;
pub use sink::*;
pub use source::*;
