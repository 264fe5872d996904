use std::path::{Path, PathBuf};

/// Configuration of a [crate::datastore::MemoryDatastore].
///
/// When a filename is configured, loading the datastore makes sure the file
/// and its parent directory exist. Documents still live in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDatastoreConfig {
    filename: Option<PathBuf>,
}

impl MemoryDatastoreConfig {
    pub fn new() -> MemoryDatastoreConfig {
        MemoryDatastoreConfig::default()
    }

    pub fn filename<P: AsRef<Path>>(mut self, filename: P) -> Self {
        self.filename = Some(filename.as_ref().to_path_buf());
        self
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.filename.as_deref()
    }
}
