use merlin_nedb::adapter::{AdapterConfig, ConnectionState, NedbAdapter, OperationOptions};
use merlin_nedb::datastore::{Datastore, DatastoreOptions};
use merlin_nedb::errors::{AdapterResult, ErrorKind};
use merlin_nedb::orm::{adapter_factory, Orm};
use merlin_nedb::query::AbstractQuery;
use merlin_nedb::stream::RecordCollector;
use merlin_nedb_int_test::test_util::{
    cleanup, connect, create_file_test_context, create_test_context, run_test, test_orm,
    DelayedDatastore, FailingDatastore, TEST_COLLECTION,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[ctor::ctor]
fn init() {
    colog::init();
}

/// Connects `adapter` and records every callback invocation.
fn connect_recording(adapter: &NedbAdapter) -> (Arc<AtomicUsize>, Arc<Mutex<Vec<AdapterResult<()>>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let results = Arc::new(Mutex::new(Vec::new()));

    let counter = Arc::clone(&calls);
    let sink = Arc::clone(&results);
    adapter.connect(move |result| {
        counter.fetch_add(1, Ordering::SeqCst);
        sink.lock().push(result);
    });
    (calls, results)
}

#[test]
fn test_factory_hook_without_models() {
    let factory = adapter_factory(AdapterConfig::new()).unwrap();
    let adapter = factory(&Orm::new());

    assert!(adapter.collection_names().is_empty());
    assert!(connect(&adapter).is_ok());
    assert_eq!(adapter.state(), ConnectionState::Connected);
    assert!(adapter.registry().is_empty());
}

#[test]
fn test_factory_hook_exposes_orm_options() {
    let factory = adapter_factory(AdapterConfig::new()).unwrap();
    let adapter = factory(&test_orm());

    assert_eq!(adapter.options().id_key(), "_id");
    assert_eq!(adapter.options().plural_foreign_key(), "_{modelName}Ids");
    assert_eq!(adapter.options().singular_foreign_key(), "_{modelName}Id");
    assert_eq!(adapter.collection_names(), ["tests", "users"]);
}

#[test]
fn test_connect_creates_collection_files() {
    run_test(
        create_file_test_context,
        |ctx| {
            let path = ctx.path().expect("file context has a path");

            assert!(path.join("tests.nedb").is_file());
            assert!(path.join("users.nedb").is_file());
            assert_eq!(ctx.adapter().state(), ConnectionState::Connected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_close_drops_collections() {
    run_test(
        create_test_context,
        |ctx| {
            let adapter = ctx.adapter();
            assert_eq!(adapter.registry().len(), 2);

            let closed = Arc::new(Mutex::new(None));
            let result = Arc::clone(&closed);
            adapter.close(move |it| *result.lock() = Some(it.is_ok()));
            assert_eq!(*closed.lock(), Some(true));

            assert!(adapter.registry().is_empty());
            assert_eq!(adapter.state(), ConnectionState::Disconnected);

            let out = RecordCollector::new();
            let err = adapter
                .find(
                    TEST_COLLECTION,
                    &OperationOptions::new(),
                    &AbstractQuery::all(),
                    out.clone(),
                )
                .err();
            assert_eq!(
                err.map(|e| e.kind().clone()),
                Some(ErrorKind::CollectionNotFound)
            );
            assert!(!out.is_closed());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_connect_while_connected_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let err = connect(&ctx.adapter()).err();
            assert_eq!(
                err.map(|e| e.kind().clone()),
                Some(ErrorKind::InvalidArgument)
            );
            assert_eq!(ctx.adapter().state(), ConnectionState::Connected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_connect_waits_for_every_load() {
    let adapter = NedbAdapter::with_config()
        .datastore_factory(|_options: DatastoreOptions| {
            Datastore::new(DelayedDatastore::new(Duration::from_millis(50)))
        })
        .build(&test_orm())
        .unwrap();

    let (calls, results) = connect_recording(&adapter);
    assert_eq!(adapter.state(), ConnectionState::Connecting);
    assert_eq!(adapter.registry().len(), 2);

    awaitility::at_most(Duration::from_secs(5)).until(|| calls.load(Ordering::SeqCst) == 1);
    thread::sleep(Duration::from_millis(100));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.lock()[0].is_ok());
    assert_eq!(adapter.state(), ConnectionState::Connected);
}

#[test]
fn test_connect_reports_first_failure_once() {
    let orm = Orm::new()
        .model("A", "a")
        .model("B", "b")
        .model("C", "c");
    let adapter = NedbAdapter::with_config()
        .datastore_factory(|_options: DatastoreOptions| {
            Datastore::new(FailingDatastore::delayed(
                "disk on fire",
                Duration::from_millis(20),
            ))
        })
        .build(&orm)
        .unwrap();

    let (calls, results) = connect_recording(&adapter);

    awaitility::at_most(Duration::from_secs(5)).until(|| calls.load(Ordering::SeqCst) >= 1);
    thread::sleep(Duration::from_millis(200));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let results = results.lock();
    let err = results[0].as_ref().err().map(|e| e.kind().clone());
    assert_eq!(err, Some(ErrorKind::StorageError));
    assert_eq!(adapter.state(), ConnectionState::Disconnected);
}

#[test]
fn test_failure_wins_over_late_success() {
    let orm = Orm::new().model("Slow", "slow").model("Broken", "broken");
    let adapter = NedbAdapter::with_config()
        .datastore_factory(|options: DatastoreOptions| {
            let broken = options
                .filename()
                .and_then(|f| f.file_stem())
                .map(|stem| stem == "broken")
                .unwrap_or(false);
            if broken {
                Datastore::new(FailingDatastore::new("cannot read"))
            } else {
                Datastore::new(DelayedDatastore::new(Duration::from_millis(50)))
            }
        })
        .database_path(std::env::temp_dir())
        .build(&orm)
        .unwrap();

    let (calls, results) = connect_recording(&adapter);

    // the broken load fails synchronously, before the slow one completes
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(adapter.state(), ConnectionState::Disconnected);
    thread::sleep(Duration::from_millis(200));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(results.lock()[0].is_err());
    assert_eq!(adapter.state(), ConnectionState::Disconnected);
}

#[test]
fn test_close_while_connecting() {
    let adapter = NedbAdapter::with_config()
        .datastore_factory(|_options: DatastoreOptions| {
            Datastore::new(DelayedDatastore::new(Duration::from_millis(50)))
        })
        .build(&test_orm())
        .unwrap();

    let (calls, _results) = connect_recording(&adapter);
    adapter.close(|result| assert!(result.is_ok()));
    assert_eq!(adapter.state(), ConnectionState::Disconnected);

    awaitility::at_most(Duration::from_secs(5)).until(|| calls.load(Ordering::SeqCst) == 1);
    assert_eq!(adapter.state(), ConnectionState::Disconnected);
    assert!(adapter.registry().is_empty());
}

#[test]
fn test_reconnect_after_close() {
    run_test(
        create_test_context,
        |ctx| {
            let adapter = ctx.adapter();
            adapter.close(|_| {});
            connect(&adapter)?;

            assert_eq!(adapter.state(), ConnectionState::Connected);
            assert!(adapter.collection(TEST_COLLECTION).is_ok());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_stale_connect_cannot_settle_newer_connect() {
    let created = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&created);
    let adapter = NedbAdapter::with_config()
        .datastore_factory(move |_options: DatastoreOptions| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Datastore::new(FailingDatastore::delayed(
                    "disk on fire",
                    Duration::from_millis(50),
                ))
            } else {
                Datastore::new(DelayedDatastore::new(Duration::from_millis(500)))
            }
        })
        .build(&test_orm())
        .unwrap();

    let (first_calls, first_results) = connect_recording(&adapter);
    adapter.close(|result| assert!(result.is_ok()));
    let (second_calls, second_results) = connect_recording(&adapter);
    assert_eq!(adapter.state(), ConnectionState::Connecting);

    // the first attempt fails while the second is still loading
    awaitility::at_most(Duration::from_secs(5))
        .until(|| first_calls.load(Ordering::SeqCst) == 1);
    assert!(first_results.lock()[0].is_err());
    assert_eq!(adapter.state(), ConnectionState::Connecting);

    awaitility::at_most(Duration::from_secs(5))
        .until(|| second_calls.load(Ordering::SeqCst) == 1);
    assert!(second_results.lock()[0].is_ok());
    assert_eq!(adapter.state(), ConnectionState::Connected);
    assert_eq!(adapter.registry().len(), 2);
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
}
