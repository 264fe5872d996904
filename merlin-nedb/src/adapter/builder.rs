use crate::adapter::{AdapterConfig, NedbAdapter};
use crate::datastore::{DatastoreFactory, DatastoreFactoryProvider};
use crate::errors::{AdapterError, AdapterResult};
use crate::orm::Orm;
use std::path::PathBuf;

/// Builder for a [NedbAdapter].
///
/// Errors raised while configuring are captured and returned by
/// [AdapterBuilder::build].
///
/// # Examples
///
/// ```rust,ignore
/// let adapter = NedbAdapter::with_config()
///     .database_path("/var/lib/app")
///     .build(&orm)?;
///
/// // a custom engine
/// let adapter = NedbAdapter::with_config()
///     .datastore_factory(|options: DatastoreOptions| my_datastore(options))
///     .build(&orm)?;
/// ```
#[derive(Default)]
pub struct AdapterBuilder {
    error: Option<AdapterError>,
    config: AdapterConfig,
    factory: Option<DatastoreFactory>,
}

impl AdapterBuilder {
    pub fn new() -> Self {
        AdapterBuilder::default()
    }

    /// Directory holding one `<collection>.nedb` file per collection.
    pub fn database_path<P: Into<PathBuf>>(mut self, database_path: P) -> Self {
        if self.error.is_none() {
            if let Err(err) = self.config.set_database_path(database_path.into()) {
                self.error = Some(err);
            }
        }
        self
    }

    /// Engine used to create each collection's datastore. Defaults to the
    /// in-memory datastore.
    pub fn datastore_factory<T: DatastoreFactoryProvider + 'static>(mut self, factory: T) -> Self {
        self.factory = Some(DatastoreFactory::new(factory));
        self
    }

    pub fn build(self, orm: &Orm) -> AdapterResult<NedbAdapter> {
        if let Some(err) = self.error {
            return Err(err);
        }
        self.config.validate()?;

        let factory = self.factory.unwrap_or_default();
        Ok(NedbAdapter::with_factory(orm, self.config, factory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{Datastore, DatastoreOptions, MemoryDatastore, MemoryDatastoreConfig};
    use crate::errors::ErrorKind;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::Arc;

    #[test]
    fn test_build_defaults() {
        let adapter = NedbAdapter::with_config().build(&Orm::new()).unwrap();
        assert!(adapter.config().database_path().is_none());
    }

    #[test]
    fn test_build_with_database_path() {
        let adapter = NedbAdapter::with_config()
            .database_path("/tmp/merlin")
            .build(&Orm::new())
            .unwrap();
        assert_eq!(adapter.config().database_path(), Some(Path::new("/tmp/merlin")));
    }

    #[test]
    fn test_configuration_error_is_returned_by_build() {
        let err = NedbAdapter::with_config()
            .database_path("")
            .database_path("/tmp/merlin")
            .build(&Orm::new())
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_custom_factory_receives_collection_options() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let orm = Orm::new().model("User", "users");
        let adapter = NedbAdapter::with_config()
            .database_path("/tmp/merlin")
            .datastore_factory(move |options: DatastoreOptions| {
                recorded.lock().push(options.clone());
                Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()))
            })
            .build(&orm)
            .unwrap();

        adapter.connect(|result| assert!(result.is_ok()));
        assert_eq!(
            *seen.lock(),
            vec![DatastoreOptions::with_filename("/tmp/merlin/users.nedb")]
        );
    }
}
