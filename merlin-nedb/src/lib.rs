//! # merlin-nedb - NeDB storage adapter for the Merlin ORM
//!
//! Lets the ORM run database-agnostic queries and mutations against an
//! embedded document store with the NeDB operation set (`load_database`,
//! `find`, `count`, `insert`, `update`, `remove`, `ensure_index`).
//!
//! The adapter translates the ORM's abstract vocabulary into the store's
//! native dialect, runs the operation on the collection's datastore and
//! streams the outcome through a sink.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use merlin_nedb::adapter::{NedbAdapter, OperationOptions};
//! use merlin_nedb::orm::Orm;
//! use merlin_nedb::query::{field, AbstractQuery};
//! use merlin_nedb::stream::RecordCollector;
//!
//! let orm = Orm::new().model("Test", "tests");
//! let adapter = NedbAdapter::with_config().build(&orm)?;
//! adapter.connect(|result| assert!(result.is_ok()));
//!
//! let out = RecordCollector::new();
//! let query = AbstractQuery::new(field("name").regex("^test")?);
//! adapter.find("tests", &OperationOptions::new(), &query, out.clone())?;
//! ```
//!
//! ## Module Organization
//!
//! - [`adapter`] - Connection lifecycle, collection registry and CRUD executor
//! - [`common`] - Values, documents and shared utilities
//! - [`datastore`] - Storage engine contract and the in-memory engine
//! - [`errors`] - Error types and result definitions
//! - [`orm`] - The ORM collaborator and the adapter factory hook
//! - [`query`] - Abstract queries, filters, sorts and deltas
//! - [`stream`] - Sinks and sources
//! - [`translate`] - Abstract to native translation

pub mod adapter;
pub mod common;
pub mod datastore;
pub mod errors;
pub mod orm;
pub mod query;
pub mod stream;
pub mod translate;
