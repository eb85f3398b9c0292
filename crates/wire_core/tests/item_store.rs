use rusqlite::Connection;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wire_core::{
    ItemContainer, ItemFilter, PartitionKey, ResponseStatus, SqliteItemStore, StoreError,
};

#[tokio::test]
async fn create_then_read_returns_same_body_and_etag() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    let body = json!({ "id": "p1", "name": "Alpha" });
    let created = projects.create_item(&body).await.unwrap();
    assert_eq!(created.body, body);

    let loaded = projects
        .read_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap();
    assert_eq!(loaded.body, body);
    assert_eq!(loaded.etag, created.etag);
}

#[tokio::test]
async fn create_with_taken_id_conflicts() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    projects
        .create_item(&json!({ "id": "p1", "name": "Alpha" }))
        .await
        .unwrap();
    let err = projects
        .create_item(&json!({ "id": "p1", "name": "Beta" }))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    let loaded = projects
        .read_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap();
    assert_eq!(loaded.body["name"], "Alpha");
}

#[tokio::test]
async fn items_without_string_id_are_rejected() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    for body in [json!({ "name": "no id" }), json!({ "id": 7 }), json!({ "id": "" })] {
        let err = projects.create_item(&body).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidItem(_)), "body {body}");
    }
    assert!(projects.query_items(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn read_missing_item_is_not_found() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    let err = projects
        .read_item("missing", &PartitionKey::from("missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn containers_are_isolated() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");
    let documents = store.container("documents");

    projects
        .create_item(&json!({ "id": "shared", "name": "Alpha" }))
        .await
        .unwrap();
    documents
        .create_item(&json!({ "id": "shared", "title": "Doc" }))
        .await
        .unwrap();

    assert_eq!(projects.query_items(None).await.unwrap().len(), 1);
    let doc = documents
        .read_item("shared", &PartitionKey::from("shared"))
        .await
        .unwrap();
    assert_eq!(doc.body["title"], "Doc");
}

#[tokio::test]
async fn replace_changes_body_and_etag() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    let created = projects
        .create_item(&json!({ "id": "p1", "name": "Alpha" }))
        .await
        .unwrap();
    let replaced = projects
        .replace_item(
            "p1",
            &PartitionKey::from("p1"),
            &json!({ "id": "p1", "name": "Renamed" }),
        )
        .await
        .unwrap();
    assert_ne!(replaced.etag, created.etag);

    let loaded = projects
        .read_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap();
    assert_eq!(loaded.body["name"], "Renamed");
    assert_eq!(loaded.etag, replaced.etag);
}

#[tokio::test]
async fn replace_missing_item_is_not_found_and_writes_nothing() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    let err = projects
        .replace_item(
            "ghost",
            &PartitionKey::from("ghost"),
            &json!({ "id": "ghost", "name": "Ghost" }),
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(projects.query_items(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn replace_with_mismatched_body_id_is_rejected() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    projects
        .create_item(&json!({ "id": "p1", "name": "Alpha" }))
        .await
        .unwrap();
    let err = projects
        .replace_item(
            "p1",
            &PartitionKey::from("p1"),
            &json!({ "id": "p2", "name": "Other" }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidItem(_)));
}

#[tokio::test]
async fn delete_reports_no_content_then_not_found() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let projects = store.container("projects");

    projects
        .create_item(&json!({ "id": "p1", "name": "Alpha" }))
        .await
        .unwrap();

    let status = projects
        .delete_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap();
    assert_eq!(status, ResponseStatus::NoContent);

    let err = projects
        .delete_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn query_filters_on_top_level_field_in_insertion_order() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let documents = store.container("documents");

    for (id, project) in [("d1", "a"), ("d2", "b"), ("d3", "a"), ("d4", "c")] {
        documents
            .create_item(&json!({ "id": id, "projectId": project, "title": id }))
            .await
            .unwrap();
    }

    let filter = ItemFilter::field_equals("projectId", "a");
    let ids: Vec<String> = documents
        .query_items(Some(&filter))
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.body["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["d1", "d3"]);

    let none = ItemFilter::field_equals("projectId", "zzz");
    assert!(documents.query_items(Some(&none)).await.unwrap().is_empty());
    assert_eq!(documents.query_items(None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn query_matches_integer_and_bool_values() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let items = store.container("items");

    items
        .create_item(&json!({ "id": "i1", "rank": 3, "pinned": true }))
        .await
        .unwrap();
    items
        .create_item(&json!({ "id": "i2", "rank": 5, "pinned": false }))
        .await
        .unwrap();

    let by_rank = items
        .query_items(Some(&ItemFilter::field_equals("rank", 5_i64)))
        .await
        .unwrap();
    assert_eq!(by_rank.len(), 1);
    assert_eq!(by_rank[0].body["id"], "i2");

    let pinned = items
        .query_items(Some(&ItemFilter::field_equals("pinned", true)))
        .await
        .unwrap();
    assert_eq!(pinned.len(), 1);
    assert_eq!(pinned[0].body["id"], "i1");
}

#[tokio::test]
async fn query_rejects_non_identifier_field_names() {
    let store = SqliteItemStore::open_in_memory().unwrap();
    let documents = store.container("documents");

    let filter = ItemFilter::field_equals("projectId') OR 1=1 --", "a");
    let err = documents.query_items(Some(&filter)).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidQuery(_)));
}

#[tokio::test]
async fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wire.sqlite3");

    {
        let store = SqliteItemStore::open(&path).unwrap();
        store
            .container("projects")
            .create_item(&json!({ "id": "p1", "name": "Alpha" }))
            .await
            .unwrap();
    }

    let store = SqliteItemStore::open(&path).unwrap();
    let loaded = store
        .container("projects")
        .read_item("p1", &PartitionKey::from("p1"))
        .await
        .unwrap();
    assert_eq!(loaded.body["name"], "Alpha");
}

#[tokio::test(flavor = "current_thread")]
async fn waiting_on_a_locked_database_does_not_stall_other_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wire.sqlite3");
    let store = SqliteItemStore::open(&path).unwrap();

    let locker = Connection::open(&path).unwrap();
    locker.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = {
        let ticks = Arc::clone(&ticks);
        tokio::spawn(async move {
            for _ in 0..20 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
            locker.execute_batch("COMMIT;").unwrap();
        })
    };

    let created = store
        .container("projects")
        .create_item(&json!({ "id": "p1", "name": "Alpha" }))
        .await;

    assert!(created.is_ok(), "write should succeed once the lock is released");
    assert_eq!(ticks.load(Ordering::SeqCst), 20);
    ticker.await.unwrap();
}
