use crate::datastore::{Datastore, DatastoreOptions, MemoryDatastore, MemoryDatastoreConfig};
use std::ops::Deref;
use std::sync::Arc;

/// Creates the [Datastore] of one collection.
///
/// Closures `Fn(DatastoreOptions) -> Datastore` are factories too.
pub trait DatastoreFactoryProvider: Send + Sync {
    fn create(&self, options: DatastoreOptions) -> Datastore;
}

impl<F> DatastoreFactoryProvider for F
where
    F: Fn(DatastoreOptions) -> Datastore + Send + Sync,
{
    fn create(&self, options: DatastoreOptions) -> Datastore {
        self(options)
    }
}

/// Cloneable handle to a [DatastoreFactoryProvider].
#[derive(Clone)]
pub struct DatastoreFactory {
    inner: Arc<dyn DatastoreFactoryProvider>,
}

impl DatastoreFactory {
    pub fn new<T: DatastoreFactoryProvider + 'static>(inner: T) -> Self {
        DatastoreFactory {
            inner: Arc::new(inner),
        }
    }
}

impl Default for DatastoreFactory {
    fn default() -> Self {
        DatastoreFactory::new(MemoryDatastoreFactory)
    }
}

impl Deref for DatastoreFactory {
    type Target = Arc<dyn DatastoreFactoryProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Factory of [MemoryDatastore]s, the default engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDatastoreFactory;

impl DatastoreFactoryProvider for MemoryDatastoreFactory {
    fn create(&self, options: DatastoreOptions) -> Datastore {
        let mut config = MemoryDatastoreConfig::new();
        if let Some(filename) = options.filename() {
            config = config.filename(filename);
        }
        Datastore::new(MemoryDatastore::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factory_creates_distinct_datastores() {
        let factory = DatastoreFactory::default();
        let first = factory.create(DatastoreOptions::new());
        let second = factory.create(DatastoreOptions::new());
        assert!(!first.same_as(&second));
        assert!(first.same_as(&first.clone()));
    }

    #[test]
    fn test_closure_factory() {
        let shared = Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()));
        let captured = shared.clone();
        let factory = DatastoreFactory::new(move |_options: DatastoreOptions| captured.clone());
        assert!(factory.create(DatastoreOptions::new()).same_as(&shared));
    }
}
