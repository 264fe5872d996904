use crate::common::Document;
use crate::datastore::{
    CountCursor, CountRequest, EnsureIndexOptions, FindCursor, FindRequest, UpdateOptions,
};
use crate::errors::AdapterResult;
use crate::translate::{NativeDelta, NativeFilter};
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Completion callback of an asynchronous datastore operation.
///
/// Invoked exactly once, possibly on a thread owned by the datastore.
pub type Callback<T> = Box<dyn FnOnce(AdapterResult<T>) + Send + 'static>;

/// Contract of the embedded document store backing one collection.
///
/// Every operation is asynchronous: it returns immediately and reports its
/// outcome through the callback. Filters, deltas and sort weights are
/// already in the native dialect produced by the translators.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; callbacks may be invoked from any thread.
pub trait DatastoreProvider: Send + Sync {
    /// Loads (or creates) the underlying database. Must complete before the
    /// collection is considered connected.
    fn load_database(&self, callback: Callback<()>);

    /// Finds matching documents, honoring sort, skip and limit.
    fn find(&self, request: FindRequest, callback: Callback<Vec<Document>>);

    /// Counts matching documents, honoring skip and limit.
    fn count(&self, request: CountRequest, callback: Callback<u64>);

    /// Inserts the whole batch or nothing. Reports the stored documents,
    /// identifiers included.
    fn insert(&self, documents: Vec<Document>, callback: Callback<Vec<Document>>);

    /// Applies `delta` to matching documents and reports how many were updated.
    fn update(
        &self,
        filter: NativeFilter,
        delta: NativeDelta,
        options: UpdateOptions,
        callback: Callback<u64>,
    );

    /// Removes every matching document and reports how many were removed.
    fn remove(&self, filter: NativeFilter, callback: Callback<u64>);

    /// Creates an index on a field path if it does not exist yet.
    fn ensure_index(&self, options: EnsureIndexOptions, callback: Callback<()>);
}

/// Cloneable handle to a [DatastoreProvider].
///
/// Dereferences to the provider. `find` and `count` are shadowed by cursor
/// builders mirroring the engine API:
///
/// ```text
/// datastore.find(filter).sort(weights).skip(10).limit(5).exec(callback);
/// datastore.count(filter).exec(callback);
/// ```
#[derive(Clone)]
pub struct Datastore {
    inner: Arc<dyn DatastoreProvider>,
}

impl Datastore {
    pub fn new<T: DatastoreProvider + 'static>(inner: T) -> Self {
        Datastore {
            inner: Arc::new(inner),
        }
    }

    pub fn find(&self, filter: NativeFilter) -> FindCursor {
        FindCursor::new(self.clone(), filter)
    }

    pub fn count(&self, filter: NativeFilter) -> CountCursor {
        CountCursor::new(self.clone(), filter)
    }

    /// `true` when both handles point to the same provider.
    pub fn same_as(&self, other: &Datastore) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for Datastore {
    type Target = Arc<dyn DatastoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for Datastore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Datastore({:p})", Arc::as_ptr(&self.inner))
    }
}
