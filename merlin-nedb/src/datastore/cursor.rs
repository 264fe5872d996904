use crate::common::Document;
use crate::datastore::{Callback, Datastore, DatastoreProvider};
use crate::translate::{NativeFilter, NativeSort};

/// A `find` as received by a [crate::datastore::DatastoreProvider].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindRequest {
    pub filter: NativeFilter,
    pub sort: Option<NativeSort>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// A `count` as received by a [crate::datastore::DatastoreProvider].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountRequest {
    pub filter: NativeFilter,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

/// Deferred `find`; nothing runs until [FindCursor::exec].
pub struct FindCursor {
    datastore: Datastore,
    request: FindRequest,
}

impl FindCursor {
    pub(crate) fn new(datastore: Datastore, filter: NativeFilter) -> Self {
        FindCursor {
            datastore,
            request: FindRequest {
                filter,
                ..FindRequest::default()
            },
        }
    }

    pub fn sort(mut self, sort: NativeSort) -> Self {
        self.request.sort = Some(sort);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.request.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn request(&self) -> &FindRequest {
        &self.request
    }

    pub fn exec(self, callback: Callback<Vec<Document>>) {
        DatastoreProvider::find(&**self.datastore, self.request, callback)
    }
}

/// Deferred `count`; nothing runs until [CountCursor::exec].
pub struct CountCursor {
    datastore: Datastore,
    request: CountRequest,
}

impl CountCursor {
    pub(crate) fn new(datastore: Datastore, filter: NativeFilter) -> Self {
        CountCursor {
            datastore,
            request: CountRequest {
                filter,
                ..CountRequest::default()
            },
        }
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.request.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn request(&self) -> &CountRequest {
        &self.request
    }

    pub fn exec(self, callback: Callback<u64>) {
        DatastoreProvider::count(&**self.datastore, self.request, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datastore::{MemoryDatastore, MemoryDatastoreConfig};
    use crate::doc;
    use crate::translate::NativeSort;
    use std::sync::mpsc;

    #[test]
    fn test_find_cursor_collects_options() {
        let datastore = Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()));
        let sort: NativeSort = vec![("a", 1)].into_iter().collect();
        let cursor = datastore
            .find(doc! { a: 1 })
            .sort(sort.clone())
            .skip(2)
            .limit(3);

        assert_eq!(
            cursor.request(),
            &FindRequest {
                filter: doc! { a: 1 },
                sort: Some(sort),
                skip: Some(2),
                limit: Some(3),
            }
        );
    }

    #[test]
    fn test_cursor_exec_reaches_provider() {
        let datastore = Datastore::new(MemoryDatastore::new(MemoryDatastoreConfig::new()));
        let (tx, rx) = mpsc::channel();
        datastore.insert(
            vec![doc! { a: 1 }, doc! { a: 2 }, doc! { a: 3 }],
            Box::new(|result| assert!(result.is_ok())),
        );

        datastore.count(doc! {}).skip(1).exec(Box::new(move |result| {
            tx.send(result.unwrap()).unwrap();
        }));
        assert_eq!(rx.recv().unwrap(), 2);
    }
}
