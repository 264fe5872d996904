//! The ORM's backend-agnostic query vocabulary.
//!
//! An [AbstractQuery] couples a [FilterTree] with pagination and a
//! [SortSpec]; an [AbstractDelta] describes a mutation with update operator
//! tags. Neither knows anything about the datastore they end up on, see
//! [`crate::translate`] for that.
//!
//! # Examples
//!
//! ```rust,ignore
//! use merlin_nedb::query::{asc, field, AbstractDelta, AbstractQuery, SortSpec};
//!
//! let filter = field("age").gt(30).and(field("tags").not_in(vec!["archived"]));
//! let query = AbstractQuery::new(filter)
//!     .offset(10)
//!     .limit(20)
//!     .sort(SortSpec::new().then(asc("name")));
//!
//! let delta = AbstractDelta::new().set("status", "active").unset(vec!["draft"]);
//! ```

mod delta;
mod filter;
mod fluent;
mod query;
mod sort;

pub use delta::*;
pub use filter::*;
pub use fluent::*;
pub use query::*;
pub use sort::*;
