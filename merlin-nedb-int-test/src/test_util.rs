use merlin_nedb::adapter::{NedbAdapter, OperationOptions};
use merlin_nedb::common::{async_task, Document};
use merlin_nedb::datastore::{
    Callback, CountRequest, Datastore, DatastoreOptions, DatastoreProvider, EnsureIndexOptions,
    FindRequest, MemoryDatastore, MemoryDatastoreConfig, UpdateOptions,
};
use merlin_nedb::errors::{AdapterError, AdapterResult, ErrorKind};
use merlin_nedb::orm::Orm;
use merlin_nedb::stream::{CountCollector, RecordCollector, VecSource};
use merlin_nedb::translate::{NativeDelta, NativeFilter};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Collection every test context registers.
pub const TEST_COLLECTION: &str = "tests";

/// Runs a test between `before` and `after`, retrying a failed attempt.
///
/// `after` runs even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> AdapterResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> AdapterResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> AdapterResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            let ctx = before().map_err(|e| {
                (format!("Before run failed: {:?}", e), backtrace.to_string())
            })?;

            match test(ctx.clone()) {
                Ok(_) => after(ctx).map_err(|e| {
                    (format!("After run failed: {:?}", e), backtrace.to_string())
                }),
                Err(e) => {
                    let _ = after(ctx);
                    Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                }
            }
        });

        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, _backtrace))) => e,
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "Test attempt {}/{} failed after {:?}: {}",
                attempt,
                MAX_RETRIES,
                start_time.elapsed(),
                error
            );
            thread::sleep(Duration::from_millis(50 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: Option<PathBuf>,
    adapter: NedbAdapter,
}

impl TestContext {
    pub fn new(path: Option<PathBuf>, adapter: NedbAdapter) -> Self {
        Self { path, adapter }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn adapter(&self) -> NedbAdapter {
        self.adapter.clone()
    }
}

pub fn random_path() -> PathBuf {
    env::temp_dir().join(uuid::Uuid::new_v4().to_string())
}

pub fn test_orm() -> Orm {
    Orm::new().model("Test", TEST_COLLECTION).model("User", "users")
}

/// A connected in-memory adapter.
pub fn create_test_context() -> AdapterResult<TestContext> {
    let adapter = NedbAdapter::with_config().build(&test_orm())?;
    connect(&adapter)?;
    Ok(TestContext::new(None, adapter))
}

/// A connected adapter whose collections have files in a fresh directory.
pub fn create_file_test_context() -> AdapterResult<TestContext> {
    let path = random_path();
    let adapter = NedbAdapter::with_config()
        .database_path(&path)
        .build(&test_orm())?;
    connect(&adapter)?;
    Ok(TestContext::new(Some(path), adapter))
}

/// A connected adapter whose datastores answer on background threads.
pub fn create_delayed_test_context() -> AdapterResult<TestContext> {
    let adapter = NedbAdapter::with_config()
        .datastore_factory(|_options: DatastoreOptions| {
            Datastore::new(DelayedDatastore::new(Duration::from_millis(10)))
        })
        .build(&test_orm())?;
    connect(&adapter)?;
    Ok(TestContext::new(None, adapter))
}

pub fn cleanup(ctx: TestContext) -> AdapterResult<()> {
    let (tx, rx) = mpsc::channel();
    ctx.adapter().close(move |result| {
        let _ = tx.send(result);
    });
    wait_result(rx)?;

    if let Some(path) = ctx.path() {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
    }
    Ok(())
}

/// Connects `adapter` and waits for the outcome.
pub fn connect(adapter: &NedbAdapter) -> AdapterResult<()> {
    let (tx, rx) = mpsc::channel();
    adapter.connect(move |result| {
        let _ = tx.send(result);
    });
    wait_result(rx)
}

/// Inserts `records` into `name` and returns them as stored.
pub fn seed(ctx: &TestContext, name: &str, records: Vec<Document>) -> AdapterResult<Vec<Document>> {
    let out = RecordCollector::new();
    ctx.adapter()
        .insert(name, &OperationOptions::new(), VecSource::new(records), out.clone())?;
    await_records(&out)?;
    Ok(out.records())
}

/// Waits until the sink ended or failed and returns its failure, if any.
pub fn await_records(out: &RecordCollector) -> AdapterResult<()> {
    awaitility::at_most(Duration::from_secs(5)).until(|| out.is_closed());
    match out.failure() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Waits until the sink ended or failed and returns the single count written.
pub fn await_count(out: &CountCollector) -> AdapterResult<u64> {
    awaitility::at_most(Duration::from_secs(5)).until(|| out.is_closed());
    if let Some(err) = out.failure() {
        return Err(err);
    }
    out.count().ok_or_else(|| {
        AdapterError::new("Sink ended without a count", ErrorKind::InternalError)
    })
}

fn wait_result(rx: mpsc::Receiver<AdapterResult<()>>) -> AdapterResult<()> {
    rx.recv_timeout(Duration::from_secs(5)).unwrap_or_else(|_| {
        Err(AdapterError::new(
            "Timed out waiting for completion",
            ErrorKind::InternalError,
        ))
    })
}

/// A [MemoryDatastore] answering every call on a new thread after `delay`.
#[derive(Clone)]
pub struct DelayedDatastore {
    delay: Duration,
    inner: MemoryDatastore,
}

impl DelayedDatastore {
    pub fn new(delay: Duration) -> Self {
        DelayedDatastore {
            delay,
            inner: MemoryDatastore::new(MemoryDatastoreConfig::new()),
        }
    }

    fn later<F>(&self, op: F)
    where
        F: FnOnce(&MemoryDatastore) + Send + 'static,
    {
        let delay = self.delay;
        let inner = self.inner.clone();
        async_task(move || {
            thread::sleep(delay);
            op(&inner);
        });
    }
}

impl DatastoreProvider for DelayedDatastore {
    fn load_database(&self, callback: Callback<()>) {
        self.later(move |inner| inner.load_database(callback))
    }

    fn find(&self, request: FindRequest, callback: Callback<Vec<Document>>) {
        self.later(move |inner| DatastoreProvider::find(inner, request, callback))
    }

    fn count(&self, request: CountRequest, callback: Callback<u64>) {
        self.later(move |inner| DatastoreProvider::count(inner, request, callback))
    }

    fn insert(&self, documents: Vec<Document>, callback: Callback<Vec<Document>>) {
        self.later(move |inner| inner.insert(documents, callback))
    }

    fn update(
        &self,
        filter: NativeFilter,
        delta: NativeDelta,
        options: UpdateOptions,
        callback: Callback<u64>,
    ) {
        self.later(move |inner| inner.update(filter, delta, options, callback))
    }

    fn remove(&self, filter: NativeFilter, callback: Callback<u64>) {
        self.later(move |inner| inner.remove(filter, callback))
    }

    fn ensure_index(&self, options: EnsureIndexOptions, callback: Callback<()>) {
        self.later(move |inner| inner.ensure_index(options, callback))
    }
}

/// A datastore failing every call with a `StorageError`, optionally after
/// a delay on a background thread.
#[derive(Clone)]
pub struct FailingDatastore {
    message: String,
    delay: Option<Duration>,
}

impl FailingDatastore {
    pub fn new(message: &str) -> Self {
        FailingDatastore {
            message: message.to_string(),
            delay: None,
        }
    }

    pub fn delayed(message: &str, delay: Duration) -> Self {
        FailingDatastore {
            message: message.to_string(),
            delay: Some(delay),
        }
    }

    fn fail<T: Send + 'static>(&self, callback: Callback<T>) {
        let error = AdapterError::new(&self.message, ErrorKind::StorageError);
        match self.delay {
            None => callback(Err(error)),
            Some(delay) => async_task(move || {
                thread::sleep(delay);
                callback(Err(error));
            }),
        }
    }
}

impl DatastoreProvider for FailingDatastore {
    fn load_database(&self, callback: Callback<()>) {
        self.fail(callback)
    }

    fn find(&self, _request: FindRequest, callback: Callback<Vec<Document>>) {
        self.fail(callback)
    }

    fn count(&self, _request: CountRequest, callback: Callback<u64>) {
        self.fail(callback)
    }

    fn insert(&self, _documents: Vec<Document>, callback: Callback<Vec<Document>>) {
        self.fail(callback)
    }

    fn update(
        &self,
        _filter: NativeFilter,
        _delta: NativeDelta,
        _options: UpdateOptions,
        callback: Callback<u64>,
    ) {
        self.fail(callback)
    }

    fn remove(&self, _filter: NativeFilter, callback: Callback<u64>) {
        self.fail(callback)
    }

    fn ensure_index(&self, _options: EnsureIndexOptions, callback: Callback<()>) {
        self.fail(callback)
    }
}

/// A datastore answering every `find` with a fixed batch, recording the
/// requests it received.
#[derive(Clone)]
pub struct CannedDatastore {
    records: Vec<Document>,
    requests: Arc<Mutex<Vec<FindRequest>>>,
}

impl CannedDatastore {
    pub fn new(records: Vec<Document>) -> Self {
        CannedDatastore {
            records,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<FindRequest> {
        self.requests.lock().clone()
    }
}

impl DatastoreProvider for CannedDatastore {
    fn load_database(&self, callback: Callback<()>) {
        callback(Ok(()))
    }

    fn find(&self, request: FindRequest, callback: Callback<Vec<Document>>) {
        self.requests.lock().push(request);
        callback(Ok(self.records.clone()))
    }

    fn count(&self, _request: CountRequest, callback: Callback<u64>) {
        callback(Ok(self.records.len() as u64))
    }

    fn insert(&self, documents: Vec<Document>, callback: Callback<Vec<Document>>) {
        callback(Ok(documents))
    }

    fn update(
        &self,
        _filter: NativeFilter,
        _delta: NativeDelta,
        _options: UpdateOptions,
        callback: Callback<u64>,
    ) {
        callback(Ok(0))
    }

    fn remove(&self, _filter: NativeFilter, callback: Callback<u64>) {
        callback(Ok(0))
    }

    fn ensure_index(&self, _options: EnsureIndexOptions, callback: Callback<()>) {
        callback(Ok(()))
    }
}
