/// Storage contract tests
///
/// The same checks run against every backend. The JSON file backend runs
/// everywhere; the MongoDB suite needs a server:
///
///   MONGO_URI=mongodb://localhost:27017 cargo test -p todoctl-core -- --ignored

use std::collections::HashSet;

use todoctl_core::store::{JsonFileStore, MongoStore, TodoStore};
use todoctl_core::{NewTodo, Priority, StoreError, TodoFilter, TodoPatch};

async fn round_trip(store: &dyn TodoStore) {
    let created = store.create(NewTodo::titled("Buy milk")).await.unwrap();

    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.description, "");
    assert!(!created.completed);
    assert_eq!(created.priority, Priority::Medium);
    assert_eq!(created.created_at, created.updated_at);

    let fetched = store.get(&created.id).await.unwrap();
    assert_eq!(fetched, Some(created));
}

async fn delete_then_get(store: &dyn TodoStore) {
    let todo = store.create(NewTodo::titled("short-lived")).await.unwrap();

    assert!(store.delete(&todo.id).await.unwrap());
    assert_eq!(store.get(&todo.id).await.unwrap(), None);
    // Deleting again is not an error
    assert!(!store.delete(&todo.id).await.unwrap());
}

async fn toggle_is_involution(store: &dyn TodoStore) {
    let todo = store.create(NewTodo::titled("flip me")).await.unwrap();

    let once = store.toggle(&todo.id).await.unwrap().unwrap();
    assert!(once.completed);
    assert!(once.updated_at >= once.created_at);

    let twice = store.toggle(&todo.id).await.unwrap().unwrap();
    assert_eq!(twice.completed, todo.completed);
    assert_eq!(twice.created_at, todo.created_at);
}

async fn update_merges_fields(store: &dyn TodoStore) {
    let todo = store
        .create(
            NewTodo::titled("draft")
                .with_description("keep me")
                .with_priority(Priority::Low),
        )
        .await
        .unwrap();

    let patch = TodoPatch {
        title: Some("final".into()),
        priority: Some(Priority::High),
        ..Default::default()
    };
    let updated = store.update(&todo.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.id, todo.id);
    assert_eq!(updated.title, "final");
    assert_eq!(updated.description, "keep me");
    assert_eq!(updated.priority, Priority::High);
    assert_eq!(updated.created_at, todo.created_at);
    assert!(updated.updated_at >= todo.updated_at);

    assert_eq!(store.get(&todo.id).await.unwrap(), Some(updated));
}

async fn missing_ids_are_soft(store: &dyn TodoStore, missing: &str) {
    assert_eq!(store.get(missing).await.unwrap(), None);
    assert_eq!(
        store.update(missing, TodoPatch::default()).await.unwrap(),
        None
    );
    assert_eq!(store.toggle(missing).await.unwrap(), None);
    assert!(!store.delete(missing).await.unwrap());
}

async fn malformed_ids_are_hard(store: &dyn TodoStore) {
    let err = store.get("../../etc/passwd").await.unwrap_err();
    assert!(matches!(err, StoreError::MalformedId { .. }));
}

async fn filters_partition(store: &dyn TodoStore) {
    for (i, priority) in [Priority::Low, Priority::Medium, Priority::High]
        .into_iter()
        .cycle()
        .take(7)
        .enumerate()
    {
        let todo = store
            .create(NewTodo::titled(format!("item {}", i)).with_priority(priority))
            .await
            .unwrap();
        if i % 2 == 0 {
            store.toggle(&todo.id).await.unwrap();
        }
    }

    let all = store.list(&TodoFilter::default()).await.unwrap();
    let done = store.list(&TodoFilter::completed(true)).await.unwrap();
    let open = store.list(&TodoFilter::completed(false)).await.unwrap();

    assert_eq!(done.len() + open.len(), all.len());
    assert!(done.iter().all(|t| t.completed));
    assert!(open.iter().all(|t| !t.completed));

    let all_ids: HashSet<_> = all.iter().map(|t| t.id.clone()).collect();
    let split_ids: HashSet<_> = done.iter().chain(open.iter()).map(|t| t.id.clone()).collect();
    assert_eq!(all_ids, split_ids);

    let high_done = store
        .list(&TodoFilter {
            completed: Some(true),
            priority: Some(Priority::High),
        })
        .await
        .unwrap();
    assert!(high_done
        .iter()
        .all(|t| t.completed && t.priority == Priority::High));

    // Newest first
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

async fn clear_and_import(store: &dyn TodoStore) {
    store.create(NewTodo::titled("one")).await.unwrap();
    store.create(NewTodo::titled("two")).await.unwrap();

    let removed = store.clear().await.unwrap();
    assert!(removed >= 2);
    assert!(store.list(&TodoFilter::default()).await.unwrap().is_empty());

    let records = vec![
        NewTodo::titled("a").into(),
        NewTodo::titled("b").with_priority(Priority::High).into(),
    ];
    assert_eq!(store.import(records).await.unwrap(), 2);
    assert_eq!(store.list(&TodoFilter::default()).await.unwrap().len(), 2);
}

mod file_backend {
    use super::*;

    async fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("todos.json"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_dir, store) = store().await;
        round_trip(&store).await;
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (_dir, store) = store().await;
        delete_then_get(&store).await;
    }

    #[tokio::test]
    async fn test_toggle_is_involution() {
        let (_dir, store) = store().await;
        toggle_is_involution(&store).await;
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (_dir, store) = store().await;
        update_merges_fields(&store).await;
    }

    #[tokio::test]
    async fn test_missing_ids_are_soft() {
        let (_dir, store) = store().await;
        missing_ids_are_soft(&store, "3f1c2a9e-0000-4000-8000-000000000000").await;
    }

    #[tokio::test]
    async fn test_malformed_ids_are_hard() {
        let (_dir, store) = store().await;
        malformed_ids_are_hard(&store).await;
    }

    #[tokio::test]
    async fn test_filters_partition() {
        let (_dir, store) = store().await;
        filters_partition(&store).await;
    }

    #[tokio::test]
    async fn test_clear_and_import() {
        let (_dir, store) = store().await;
        clear_and_import(&store).await;
    }

    #[tokio::test]
    async fn test_reopen_sees_persisted_data() {
        let (dir, store) = store().await;
        let todo = store.create(NewTodo::titled("durable")).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(dir.path().join("todos.json"))
            .await
            .unwrap();
        assert_eq!(reopened.get(&todo.id).await.unwrap(), Some(todo));
    }
}

mod mongo_backend {
    use super::*;

    fn mongo_uri() -> String {
        std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    /// Each test gets its own collection so tests can run in parallel
    async fn store(name: &str) -> MongoStore {
        let store = MongoStore::connect_to(&mongo_uri(), "todoctl_test", name)
            .await
            .expect("MongoDB client");
        store.ping().await.expect("MongoDB reachable");
        store.drop_collection().await.unwrap();
        store
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_round_trip() {
        let store = store("round_trip").await;
        round_trip(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_delete_then_get() {
        let store = store("delete_then_get").await;
        delete_then_get(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_toggle_is_involution() {
        let store = store("toggle").await;
        toggle_is_involution(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_update_merges_fields() {
        let store = store("update").await;
        update_merges_fields(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_missing_ids_are_soft() {
        let store = store("missing").await;
        missing_ids_are_soft(&store, "0123456789abcdef01234567").await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_malformed_ids_are_hard() {
        let store = store("malformed").await;
        malformed_ids_are_hard(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_filters_partition() {
        let store = store("filters").await;
        filters_partition(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires MongoDB"]
    async fn test_clear_and_import() {
        let store = store("clear_import").await;
        clear_and_import(&store).await;
    }
}
