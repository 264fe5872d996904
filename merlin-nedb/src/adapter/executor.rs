use crate::adapter::{NedbAdapter, OperationOptions};
use crate::common::{split_path, Document, OPERATOR_MARKER};
use crate::datastore::{Callback, EnsureIndexOptions, UpdateOptions};
use crate::errors::{AdapterError, AdapterResult, ErrorKind};
use crate::query::{AbstractDelta, AbstractQuery};
use crate::stream::{CountSink, RecordSink, RecordSource};
use crate::translate::{translate_delta, translate_query, translate_sort};

/// CRUD operations.
///
/// Every operation checks its arguments and resolves the collection before
/// touching the datastore; those failures are returned synchronously.
/// Datastore failures are asynchronous and reach the sink (or callback)
/// unchanged.
impl NedbAdapter {
    /// Counts the records matching `query`, honoring its offset and limit.
    /// Writes exactly one number to `out`.
    pub fn count<S>(
        &self,
        name: &str,
        options: &OperationOptions,
        query: &AbstractQuery,
        out: S,
    ) -> AdapterResult<()>
    where
        S: CountSink + 'static,
    {
        let datastore = self.collection(name)?;
        let filter = translate_query(query);
        log::debug!("count on {} with {} ({:?})", name, filter, options);

        let mut cursor = datastore.count(filter);
        if let Some(offset) = query.options().offset() {
            cursor = cursor.skip(offset);
        }
        if let Some(limit) = query.options().limit() {
            cursor = cursor.limit(limit);
        }
        cursor.exec(count_callback("count", name, out));
        Ok(())
    }

    /// Finds the records matching `query`, sorted and paginated, runs the
    /// query's post-filter over the whole batch and streams the result.
    pub fn find<S>(
        &self,
        name: &str,
        options: &OperationOptions,
        query: &AbstractQuery,
        out: S,
    ) -> AdapterResult<()>
    where
        S: RecordSink + 'static,
    {
        let datastore = self.collection(name)?;
        let filter = translate_query(query);
        let sort = translate_sort(query.options().sort());
        log::debug!("find on {} with {} ({:?})", name, filter, options);

        let mut cursor = datastore.find(filter);
        if let Some(sort) = sort {
            cursor = cursor.sort(sort);
        }
        if let Some(offset) = query.options().offset() {
            cursor = cursor.skip(offset);
        }
        if let Some(limit) = query.options().limit() {
            cursor = cursor.limit(limit);
        }

        let query = query.clone();
        let name = name.to_string();
        let mut out = out;
        cursor.exec(Box::new(move |result| match result {
            Ok(records) => {
                let records = query.apply_post_filter(records);
                log::trace!("find on {} produced {} records", name, records.len());
                stream_records(records, &mut out);
            }
            Err(err) => {
                log::error!("find on {} failed: {}", name, err);
                out.error(err);
            }
        }));
        Ok(())
    }

    /// Drains `input`, inserts the whole batch and streams the stored
    /// records, identifiers included.
    pub fn insert<I, S>(
        &self,
        name: &str,
        options: &OperationOptions,
        input: I,
        out: S,
    ) -> AdapterResult<()>
    where
        I: RecordSource + 'static,
        S: RecordSink + 'static,
    {
        let datastore = self.collection(name)?;
        log::debug!("insert on {} ({:?})", name, options);

        let name = name.to_string();
        let mut input = input;
        let mut out = out;
        input.all(Box::new(move |batch| match batch {
            Ok(records) => {
                log::trace!("inserting {} records into {}", records.len(), name);
                datastore.insert(
                    records,
                    Box::new(move |result| match result {
                        Ok(inserted) => stream_records(inserted, &mut out),
                        Err(err) => {
                            log::error!("insert on {} failed: {}", name, err);
                            out.error(err);
                        }
                    }),
                );
            }
            Err(err) => {
                log::error!("Reading the records to insert into {} failed: {}", name, err);
                out.error(err);
            }
        }));
        Ok(())
    }

    /// Applies `delta` to every record matching `query`, or to the first one
    /// when `options.single` is set. Writes the number of updated records.
    pub fn update<S>(
        &self,
        name: &str,
        options: &OperationOptions,
        query: &AbstractQuery,
        delta: &AbstractDelta,
        out: S,
    ) -> AdapterResult<()>
    where
        S: CountSink + 'static,
    {
        let datastore = self.collection(name)?;
        let filter = translate_query(query);
        let native_delta = translate_delta(delta);
        log::debug!(
            "update on {} with {} and {} ({:?})",
            name,
            filter,
            native_delta,
            options
        );

        datastore.update(
            filter,
            native_delta,
            UpdateOptions::multi(!options.single),
            count_callback("update", name, out),
        );
        Ok(())
    }

    /// Removes every record matching `query`; pagination is ignored. Writes
    /// the number of removed records.
    pub fn remove<S>(
        &self,
        name: &str,
        options: &OperationOptions,
        query: &AbstractQuery,
        out: S,
    ) -> AdapterResult<()>
    where
        S: CountSink + 'static,
    {
        let datastore = self.collection(name)?;
        let filter = translate_query(query);
        log::debug!("remove on {} with {} ({:?})", name, filter, options);

        datastore.remove(filter, count_callback("remove", name, out));
        Ok(())
    }

    /// Creates an index on `field_path` with the `unique` and `sparse`
    /// constraints of `options`.
    ///
    /// A malformed field path is reported through `callback` as a
    /// `ValidationError`.
    pub fn index<F>(
        &self,
        name: &str,
        options: &OperationOptions,
        field_path: &str,
        callback: F,
    ) -> AdapterResult<()>
    where
        F: FnOnce(AdapterResult<()>) + Send + 'static,
    {
        if field_path.is_empty() {
            log::error!("Index field path cannot be empty");
            return Err(AdapterError::new(
                "Index field path cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        let datastore = self.collection(name)?;

        if let Err(err) = validate_field_path(field_path) {
            log::error!("Cannot index {} on {}: {}", field_path, name, err);
            callback(Err(err));
            return Ok(());
        }

        let index_options = EnsureIndexOptions::new(field_path)
            .unique(options.unique)
            .sparse(options.sparse);
        log::debug!("index on {} with {:?}", name, index_options);

        let name = name.to_string();
        datastore.ensure_index(
            index_options,
            Box::new(move |result| {
                if let Err(err) = &result {
                    log::error!("index on {} failed: {}", name, err);
                }
                callback(result)
            }),
        );
        Ok(())
    }
}

fn stream_records<S: RecordSink>(records: Vec<Document>, out: &mut S) {
    for record in records {
        out.write(record);
    }
    out.end();
}

fn count_callback<S>(operation: &'static str, name: &str, out: S) -> Callback<u64>
where
    S: CountSink + 'static,
{
    let name = name.to_string();
    let mut out = out;
    Box::new(move |result| match result {
        Ok(count) => {
            log::trace!("{} on {} affected {} records", operation, name, count);
            out.write(count);
            out.end();
        }
        Err(err) => {
            log::error!("{} on {} failed: {}", operation, name, err);
            out.error(err);
        }
    })
}

fn validate_field_path(field_path: &str) -> AdapterResult<()> {
    for segment in split_path(field_path) {
        if segment.is_empty() {
            return Err(AdapterError::new(
                &format!("Field path {} contains an empty segment", field_path),
                ErrorKind::ValidationError,
            ));
        }
        if segment.starts_with(OPERATOR_MARKER) {
            return Err(AdapterError::new(
                &format!("Field path {} cannot contain an operator", field_path),
                ErrorKind::ValidationError,
            ));
        }
    }
    Ok(())
}
