use crate::common::DATASTORE_FILE_EXTENSION;
use crate::datastore::DatastoreOptions;
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use std::path::{Path, PathBuf};

/// Adapter configuration.
///
/// Without a database path every collection lives in memory. With one,
/// collection `users` is stored in `<database_path>/users.nedb`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    database_path: Option<PathBuf>,
}

impl AdapterConfig {
    pub fn new() -> Self {
        AdapterConfig::default()
    }

    pub fn with_database_path<P: Into<PathBuf>>(database_path: P) -> Self {
        AdapterConfig {
            database_path: Some(database_path.into()),
        }
    }

    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    pub(crate) fn set_database_path(&mut self, database_path: PathBuf) -> AdapterResult<()> {
        if database_path.as_os_str().is_empty() {
            log::error!("Database path cannot be empty");
            return Err(AdapterError::new(
                "Database path cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        self.database_path = Some(database_path);
        Ok(())
    }

    /// Checks the configuration before an adapter is built from it.
    pub fn validate(&self) -> AdapterResult<()> {
        match &self.database_path {
            Some(path) if path.as_os_str().is_empty() => Err(AdapterError::new(
                "Database path cannot be empty",
                ErrorKind::InvalidArgument,
            )),
            _ => Ok(()),
        }
    }

    /// Options of the datastore backing `collection_name`.
    pub fn datastore_options(&self, collection_name: &str) -> DatastoreOptions {
        match &self.database_path {
            Some(path) => DatastoreOptions::with_filename(
                path.join(format!("{}.{}", collection_name, DATASTORE_FILE_EXTENSION)),
            ),
            None => DatastoreOptions::new(),
        }
    }
}
