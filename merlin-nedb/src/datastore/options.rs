use std::path::{Path, PathBuf};

/// Options a [crate::datastore::Datastore] is created with.
///
/// Without a filename the datastore lives in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatastoreOptions {
    filename: Option<PathBuf>,
}

impl DatastoreOptions {
    pub fn new() -> Self {
        DatastoreOptions::default()
    }

    pub fn with_filename<P: Into<PathBuf>>(filename: P) -> Self {
        DatastoreOptions {
            filename: Some(filename.into()),
        }
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn is_in_memory(&self) -> bool {
        self.filename.is_none()
    }
}

/// Options of a native update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Update every matching document instead of the first one.
    pub multi: bool,
}

impl UpdateOptions {
    pub fn multi(multi: bool) -> Self {
        UpdateOptions { multi }
    }
}

/// Options of a native index creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureIndexOptions {
    pub field_name: String,
    pub unique: bool,
    pub sparse: bool,
}

impl EnsureIndexOptions {
    pub fn new(field_name: &str) -> Self {
        EnsureIndexOptions {
            field_name: field_name.to_string(),
            unique: false,
            sparse: false,
        }
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }
}
