use crate::common::{atomic, Atomic, Document, ReadExecutor, Value, WriteExecutor, DOC_ID};
use crate::datastore::memory::index::MemoryIndex;
use crate::datastore::memory::matcher::{matches, resolve};
use crate::datastore::memory::modifier::apply_delta;
use crate::datastore::{
    Callback, CountRequest, DatastoreProvider, EnsureIndexOptions, FindRequest,
    MemoryDatastoreConfig, UpdateOptions,
};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use crate::translate::{NativeDelta, NativeFilter, NativeSort};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fs::{self, OpenOptions};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory implementation of [DatastoreProvider].
///
/// Operations complete synchronously and invoke the callback on the calling
/// thread. Every collection has a unique index on `_id`.
///
/// # Usage
/// ```text
/// let datastore = Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()));
/// datastore.insert(vec![doc! { name: "a" }], Box::new(|result| { .. }));
/// datastore.find(doc! { name: "a" }).limit(1).exec(Box::new(|result| { .. }));
/// ```
#[derive(Clone)]
pub struct MemoryDatastore {
    inner: Arc<MemoryDatastoreInner>,
}

impl MemoryDatastore {
    pub fn new(config: MemoryDatastoreConfig) -> MemoryDatastore {
        MemoryDatastore {
            inner: Arc::new(MemoryDatastoreInner::new(config)),
        }
    }

    /// `true` once `load_database` succeeded.
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(AtomicOrdering::Relaxed)
    }

    pub fn config(&self) -> &MemoryDatastoreConfig {
        &self.inner.config
    }
}

impl DatastoreProvider for MemoryDatastore {
    fn load_database(&self, callback: Callback<()>) {
        callback(self.inner.load_database())
    }

    fn find(&self, request: FindRequest, callback: Callback<Vec<Document>>) {
        callback(self.inner.find(request))
    }

    fn count(&self, request: CountRequest, callback: Callback<u64>) {
        callback(self.inner.count(request))
    }

    fn insert(&self, documents: Vec<Document>, callback: Callback<Vec<Document>>) {
        callback(self.inner.insert(documents))
    }

    fn update(
        &self,
        filter: NativeFilter,
        delta: NativeDelta,
        options: UpdateOptions,
        callback: Callback<u64>,
    ) {
        callback(self.inner.update(&filter, &delta, options))
    }

    fn remove(&self, filter: NativeFilter, callback: Callback<u64>) {
        callback(self.inner.remove(&filter))
    }

    fn ensure_index(&self, options: EnsureIndexOptions, callback: Callback<()>) {
        callback(self.inner.ensure_index(options))
    }
}

struct MemoryCollection {
    documents: Vec<Document>,
    indexes: IndexMap<String, MemoryIndex>,
}

impl MemoryCollection {
    fn new() -> Self {
        let mut indexes = IndexMap::new();
        indexes.insert(
            DOC_ID.to_string(),
            MemoryIndex::new(&EnsureIndexOptions::new(DOC_ID).unique(true)),
        );
        MemoryCollection {
            documents: Vec::new(),
            indexes,
        }
    }

    fn matching(&self, filter: &Document) -> AdapterResult<Vec<&Document>> {
        let mut found = Vec::new();
        for document in &self.documents {
            if matches(document, filter)? {
                found.push(document);
            }
        }
        Ok(found)
    }

    fn validate(&self, documents: &[Document]) -> AdapterResult<()> {
        for index in self.indexes.values() {
            index.validate(documents.iter())?;
        }
        Ok(())
    }
}

struct MemoryDatastoreInner {
    config: MemoryDatastoreConfig,
    collection: Atomic<MemoryCollection>,
    loaded: AtomicBool,
}

impl MemoryDatastoreInner {
    fn new(config: MemoryDatastoreConfig) -> Self {
        MemoryDatastoreInner {
            config,
            collection: atomic(MemoryCollection::new()),
            loaded: AtomicBool::new(false),
        }
    }

    fn load_database(&self) -> AdapterResult<()> {
        if let Some(file_path) = self.config.file_path() {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            log::debug!("Datastore file {} is ready", file_path.display());
        }

        self.loaded.store(true, AtomicOrdering::Relaxed);
        Ok(())
    }

    fn find(&self, request: FindRequest) -> AdapterResult<Vec<Document>> {
        self.collection.read_with(|collection| {
            let mut found = collection.matching(&request.filter)?;
            if let Some(sort) = &request.sort {
                found.sort_by(|a, b| compare_by(a, b, sort));
            }
            Ok(paginate(found.into_iter(), request.skip, request.limit)
                .cloned()
                .collect())
        })
    }

    fn count(&self, request: CountRequest) -> AdapterResult<u64> {
        self.collection.read_with(|collection| {
            let found = collection.matching(&request.filter)?;
            Ok(paginate(found.into_iter(), request.skip, request.limit).count() as u64)
        })
    }

    fn insert(&self, documents: Vec<Document>) -> AdapterResult<Vec<Document>> {
        let inserted: Vec<Document> = documents
            .into_iter()
            .map(|mut document| {
                if document.id().map_or(true, Value::is_null) {
                    document.insert(DOC_ID, Uuid::new_v4().simple().to_string());
                }
                document
            })
            .collect();

        self.collection.write_with(|collection| {
            let mut prospective = collection.documents.clone();
            prospective.extend(inserted.iter().cloned());
            collection.validate(&prospective)?;

            collection.documents = prospective;
            log::trace!("Inserted {} documents", inserted.len());
            Ok(inserted)
        })
    }

    fn update(
        &self,
        filter: &Document,
        delta: &Document,
        options: UpdateOptions,
    ) -> AdapterResult<u64> {
        self.collection.write_with(|collection| {
            let mut prospective = collection.documents.clone();
            let mut updated = 0u64;
            for document in prospective.iter_mut() {
                if !options.multi && updated > 0 {
                    break;
                }
                if matches(document, filter)? {
                    *document = apply_delta(document, delta)?;
                    updated += 1;
                }
            }

            if updated > 0 {
                collection.validate(&prospective)?;
                collection.documents = prospective;
            }
            log::trace!("Updated {} documents", updated);
            Ok(updated)
        })
    }

    fn remove(&self, filter: &Document) -> AdapterResult<u64> {
        self.collection.write_with(|collection| {
            let mut kept = Vec::with_capacity(collection.documents.len());
            for document in collection.documents.iter() {
                if !matches(document, filter)? {
                    kept.push(document.clone());
                }
            }

            let removed = (collection.documents.len() - kept.len()) as u64;
            collection.documents = kept;
            log::trace!("Removed {} documents", removed);
            Ok(removed)
        })
    }

    fn ensure_index(&self, options: EnsureIndexOptions) -> AdapterResult<()> {
        if options.field_name.is_empty() {
            return Err(AdapterError::new(
                "Cannot create an index without a fieldName",
                ErrorKind::StorageError,
            ));
        }

        self.collection.write_with(|collection| {
            if collection.indexes.contains_key(&options.field_name) {
                return Ok(());
            }

            let index = MemoryIndex::new(&options);
            index.validate(collection.documents.iter())?;
            log::debug!("Created index on {}", index.field_name());
            collection.indexes.insert(options.field_name.clone(), index);
            Ok(())
        })
    }
}

fn compare_by(a: &Document, b: &Document, sort: &NativeSort) -> Ordering {
    for (field, weight) in sort.iter() {
        let left = first_value(a, field);
        let right = first_value(b, field);
        let ordering = left.sort_cmp(&right);
        if ordering != Ordering::Equal {
            return if *weight < 0 { ordering.reverse() } else { ordering };
        }
    }
    Ordering::Equal
}

fn first_value(document: &Document, field: &str) -> Value {
    resolve(document, field)
        .into_iter()
        .next()
        .cloned()
        .unwrap_or_default()
}

/// A limit of zero means no limit.
fn paginate<'a, I>(
    documents: I,
    skip: Option<u64>,
    limit: Option<u64>,
) -> impl Iterator<Item = &'a Document>
where
    I: Iterator<Item = &'a Document>,
{
    let limit = match limit {
        Some(0) | None => usize::MAX,
        Some(limit) => limit as usize,
    };
    documents.skip(skip.unwrap_or(0) as usize).take(limit)
}
