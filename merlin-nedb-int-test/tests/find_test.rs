use merlin_nedb::adapter::{NedbAdapter, OperationOptions};
use merlin_nedb::common::Value;
use merlin_nedb::datastore::{Datastore, DatastoreOptions};
use merlin_nedb::doc;
use merlin_nedb::errors::ErrorKind;
use merlin_nedb::query::{asc, desc, field, AbstractQuery, SortSpec};
use merlin_nedb::stream::RecordCollector;
use merlin_nedb_int_test::test_util::{
    await_records, cleanup, connect, create_delayed_test_context, create_test_context, run_test,
    seed, test_orm, CannedDatastore, TestContext, TEST_COLLECTION,
};

#[ctor::ctor]
fn init() {
    colog::init();
}

fn seed_tests(ctx: &TestContext) -> merlin_nedb::errors::AdapterResult<()> {
    seed(
        ctx,
        TEST_COLLECTION,
        vec![
            doc! { name: "test-b", rank: 2, tags: ["x", "y"] },
            doc! { name: "test-a", rank: 1, tags: ["y"] },
            doc! { name: "other", rank: 3, tags: [] },
        ],
    )?;
    Ok(())
}

fn names(out: &RecordCollector) -> Vec<String> {
    out.records()
        .iter()
        .filter_map(|r| r.get("name").and_then(Value::as_string).cloned())
        .collect()
}

#[test]
fn test_find_by_regex() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("name").regex("^test")?)
                .sort(SortSpec::new().then(asc("name")));

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            assert!(out.is_ended());
            assert_eq!(names(&out), vec!["test-a", "test-b"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_by_equality() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("name").eq("test-a"));

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            let records = out.records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].get("rank"), Some(&Value::from(1)));
            assert!(records[0].id().is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_with_negated_operators() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;

            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("name").not("other"))
                .sort(SortSpec::new().then(asc("rank")));
            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;
            assert_eq!(names(&out), vec!["test-a", "test-b"]);

            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("name").not_in(vec!["test-a", "test-b"]));
            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;
            assert_eq!(names(&out), vec!["other"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_array_membership() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("tags").eq("y"))
                .sort(SortSpec::new().then(desc("rank")));

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            assert_eq!(names(&out), vec!["test-b", "test-a"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_sorted_page() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::all()
                .sort(SortSpec::new().then(desc("rank")))
                .offset(1)
                .limit(1);

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            assert_eq!(names(&out), vec!["test-b"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_applies_projection() {
    run_test(
        create_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("rank").gte(2)).project(vec!["name"]);

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            let records = out.records();
            assert_eq!(records.len(), 2);
            for record in records {
                assert_eq!(record.len(), 2);
                assert!(record.contains_key("name"));
                assert!(record.id().is_some());
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_on_unknown_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let out = RecordCollector::new();
            let result = ctx.adapter().find(
                "missing",
                &OperationOptions::new(),
                &AbstractQuery::all(),
                out.clone(),
            );

            assert_eq!(
                result.err().map(|e| e.kind().clone()),
                Some(ErrorKind::CollectionNotFound)
            );
            assert!(!out.is_closed());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_on_background_datastore() {
    run_test(
        create_delayed_test_context,
        |ctx| {
            seed_tests(&ctx)?;
            let out = RecordCollector::new();
            let query = AbstractQuery::new(field("rank").between(1, 2))
                .sort(SortSpec::new().then(asc("rank")));

            ctx.adapter()
                .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())?;
            await_records(&out)?;

            assert_eq!(names(&out), vec!["test-a", "test-b"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_find_streams_engine_batch() {
    let engine = CannedDatastore::new(vec![doc! { name: "test-a" }, doc! { name: "test-b" }]);
    let factory_engine = engine.clone();
    let adapter = NedbAdapter::with_config()
        .datastore_factory(move |_options: DatastoreOptions| {
            Datastore::new(factory_engine.clone())
        })
        .build(&test_orm())
        .unwrap();
    connect(&adapter).unwrap();

    let out = RecordCollector::new();
    let query = AbstractQuery::new(field("name").eq("test"));
    adapter
        .find(TEST_COLLECTION, &OperationOptions::new(), &query, out.clone())
        .unwrap();
    await_records(&out).unwrap();

    let requests = engine.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].filter, doc! { name: "test" });
    assert_eq!(requests[0].sort, None);

    let mut found = names(&out);
    found.sort();
    assert_eq!(found, vec!["test-a", "test-b"]);
    assert!(out.is_ended());
}
