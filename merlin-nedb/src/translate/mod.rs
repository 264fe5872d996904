//! Translation of the abstract vocabulary into the datastore's dialect.
//!
//! - [translate_query]: filter trees, remapping `$not` to `$ne` and `$notIn`
//!   to `$nin` and wrapping regular expressions in `$regex`
//! - [translate_delta]: update deltas, rewriting `$unset` and `$pull`
//! - [translate_sort]: sort specs to `+1`/`-1` weights
//!
//! The translators are pure functions; they never fail. Operands they do not
//! understand are forwarded unchanged and rejected, if at all, by the
//! datastore.

mod delta_translator;
mod native_sort;
mod query_translator;
mod sort_translator;

pub use delta_translator::*;
pub use native_sort::*;
pub use query_translator::*;
pub use sort_translator::*;

use crate::common::Document;

/// A filter in the datastore's dialect.
pub type NativeFilter = Document;

/// An update document in the datastore's dialect.
pub type NativeDelta = Document;
