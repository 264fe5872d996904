//! Common types shared by the translators, the executor and the datastores.

mod constants;
mod document;
mod pattern;
mod type_utils;
mod value;

pub use constants::*;
pub use document::*;
pub use pattern::*;
pub use type_utils::*;
pub use value::*;
