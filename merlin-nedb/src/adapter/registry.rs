use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::datastore::Datastore;
use indexmap::IndexMap;

/// Collection name -> [Datastore] handle.
///
/// Written only by connect and close; read by every CRUD operation.
#[derive(Clone, Default)]
pub struct CollectionRegistry {
    collections: Atomic<IndexMap<String, Datastore>>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        CollectionRegistry {
            collections: atomic(IndexMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Datastore> {
        self.collections.read_with(|it| it.get(name).cloned())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collections.read_with(|it| it.contains_key(name))
    }

    /// Registers `datastore` under `name`, replacing any previous handle.
    pub fn register(&self, name: &str, datastore: Datastore) {
        self.collections.write_with(|it| {
            it.insert(name.to_string(), datastore);
        })
    }

    /// Replaces the mapping with an empty one.
    pub fn clear(&self) {
        self.collections.write_with(|it| *it = IndexMap::new())
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.collections.read_with(|it| it.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.collections.read_with(|it| it.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{MemoryDatastore, MemoryDatastoreConfig};

    fn datastore() -> Datastore {
        Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()))
    }

    #[test]
    fn test_register_and_get() {
        let registry = CollectionRegistry::new();
        let users = datastore();
        registry.register("users", users.clone());
        registry.register("posts", datastore());

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("users"));
        assert!(registry.get("users").unwrap().same_as(&users));
        assert!(registry.get("tags").is_none());
        assert_eq!(registry.names(), vec!["users", "posts"]);
    }

    #[test]
    fn test_clear() {
        let registry = CollectionRegistry::new();
        registry.register("users", datastore());
        let shared = registry.clone();
        shared.clear();

        assert!(registry.is_empty());
        assert!(registry.get("users").is_none());
    }
}
