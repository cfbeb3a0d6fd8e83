//! MongoDB backend
//!
//! One document per todo in the `todos` collection. Single-record mutations
//! use the server's atomic find-and-modify, filters are pushed down to the
//! query and `ObjectId`s are exposed as hex strings.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

use super::TodoStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{now, ImportTodo, NewTodo, Priority, Todo, TodoFilter, TodoPatch};

/// Database used when the connection string names none
pub const DEFAULT_DATABASE: &str = "todoapp";

/// Collection holding the todos
pub const COLLECTION: &str = "todos";

/// Fail fast at startup instead of waiting the driver's 30s default
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Stored document shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    priority: Priority,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl TodoDocument {
    fn from_todo_fields(id: ObjectId, todo: Todo) -> Self {
        Self {
            id,
            title: todo.title,
            description: todo.description,
            completed: todo.completed,
            priority: todo.priority,
            created_at: to_bson_date(todo.created_at),
            updated_at: to_bson_date(todo.updated_at),
        }
    }

    fn into_todo(self) -> Todo {
        Todo {
            id: self.id.to_hex(),
            title: self.title,
            description: self.description,
            completed: self.completed,
            priority: self.priority,
            created_at: from_bson_date(self.created_at),
            updated_at: from_bson_date(self.updated_at),
        }
    }
}

fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_date(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

fn parse_id(id: &str) -> StoreResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| StoreError::malformed_id(id))
}

fn filter_document(filter: &TodoFilter) -> Document {
    let mut query = Document::new();
    if let Some(completed) = filter.completed {
        query.insert("completed", completed);
    }
    if let Some(priority) = filter.priority {
        query.insert("priority", priority.as_str());
    }
    query
}

/// `updatedAt` refresh that never goes below `createdAt`
fn touched_at(at: DateTime<Utc>) -> Document {
    doc! { "$max": ["$createdAt", to_bson_date(at)] }
}

/// Aggregation-pipeline `$set` stage for a patch. String values are wrapped
/// in `$literal` so user text starting with `$` is not read as a field path.
fn patch_stage(patch: TodoPatch, at: DateTime<Utc>) -> Document {
    let mut set = Document::new();
    if let Some(title) = patch.title {
        set.insert("title", doc! { "$literal": title });
    }
    if let Some(description) = patch.description {
        set.insert("description", doc! { "$literal": description });
    }
    if let Some(completed) = patch.completed {
        set.insert("completed", completed);
    }
    if let Some(priority) = patch.priority {
        set.insert("priority", priority.as_str());
    }
    set.insert("updatedAt", touched_at(at));
    doc! { "$set": set }
}

/// Strip `user:password@` from a connection string for logging
pub fn redact_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let rest = &uri[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://{}", &uri[..scheme_end], &rest[at + 1..]),
        None => uri.to_string(),
    }
}

/// Todos stored in a MongoDB collection
pub struct MongoStore {
    client: Client,
    collection: Collection<TodoDocument>,
    database_name: String,
}

impl MongoStore {
    /// Build a client for `uri`. The database comes from the URI path,
    /// defaulting to [`DEFAULT_DATABASE`].
    ///
    /// The driver connects lazily; call [`TodoStore::ping`] to verify.
    pub async fn connect(uri: &str) -> StoreResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;
        let database = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        Self::with_options(options, &database, COLLECTION)
    }

    /// Connect to an explicit database and collection
    pub async fn connect_to(uri: &str, database: &str, collection: &str) -> StoreResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;
        Self::with_options(options, database, collection)
    }

    fn with_options(
        mut options: ClientOptions,
        database: &str,
        collection: &str,
    ) -> StoreResult<Self> {
        if options.app_name.is_none() {
            options.app_name = Some("todoctl".to_string());
        }
        if options.server_selection_timeout.is_none() {
            options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        }

        let client =
            Client::with_options(options).map_err(|e| StoreError::connection(e.to_string()))?;
        let collection = client.database(database).collection(collection);

        Ok(Self {
            client,
            collection,
            database_name: database.to_string(),
        })
    }

    /// Database holding the collection
    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Drop the whole collection (test cleanup)
    pub async fn drop_collection(&self) -> StoreResult<()> {
        self.collection.drop().await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    fn backend_type(&self) -> &'static str {
        "mongodb"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database(&self.database_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::connection(e.to_string()))?;
        Ok(())
    }

    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        let docs: Vec<TodoDocument> = self
            .collection
            .find(filter_document(filter))
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(docs.into_iter().map(TodoDocument::into_todo).collect())
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Todo>> {
        let oid = parse_id(id)?;
        let doc = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(doc.map(TodoDocument::into_todo))
    }

    async fn create(&self, new: NewTodo) -> StoreResult<Todo> {
        let oid = ObjectId::new();
        let todo = Todo::create(oid.to_hex(), new, now());
        let doc = TodoDocument::from_todo_fields(oid, todo.clone());

        self.collection.insert_one(&doc).await?;
        tracing::debug!(id = %todo.id, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        let oid = parse_id(id)?;
        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, vec![patch_stage(patch, now())])
            .return_document(ReturnDocument::After)
            .await?;
        Ok(doc.map(TodoDocument::into_todo))
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let oid = parse_id(id)?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn toggle(&self, id: &str) -> StoreResult<Option<Todo>> {
        let oid = parse_id(id)?;
        let stage = doc! {
            "$set": {
                "completed": { "$not": ["$completed"] },
                "updatedAt": touched_at(now()),
            }
        };
        let doc = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, vec![stage])
            .return_document(ReturnDocument::After)
            .await?;
        Ok(doc.map(TodoDocument::into_todo))
    }

    async fn clear(&self) -> StoreResult<u64> {
        let result = self.collection.delete_many(doc! {}).await?;
        Ok(result.deleted_count)
    }

    async fn import(&self, records: Vec<ImportTodo>) -> StoreResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let at = now();
        let docs: Vec<TodoDocument> = records
            .into_iter()
            .map(|record| {
                let oid = ObjectId::new();
                TodoDocument::from_todo_fields(oid, Todo::import(oid.to_hex(), record, at))
            })
            .collect();

        let result = self.collection.insert_many(docs).await?;
        Ok(result.inserted_ids.len())
    }

    async fn shutdown(&self) {
        tracing::info!(database = %self.database_name, "closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_credentials_only() {
        assert_eq!(
            redact_uri("mongodb+srv://user:pw@cluster.example.net/todoapp?retryWrites=true"),
            "mongodb+srv://cluster.example.net/todoapp?retryWrites=true"
        );
        assert_eq!(
            redact_uri("mongodb://localhost:27017/todoapp"),
            "mongodb://localhost:27017/todoapp"
        );
    }

    #[test]
    fn filter_pushdown() {
        assert_eq!(filter_document(&TodoFilter::default()), doc! {});
        let filter = TodoFilter {
            completed: Some(true),
            priority: Some(Priority::High),
        };
        assert_eq!(
            filter_document(&filter),
            doc! { "completed": true, "priority": "high" }
        );
    }

    #[test]
    fn patch_stage_sets_only_supplied_fields() {
        let patch = TodoPatch {
            title: Some("$notAField".into()),
            ..Default::default()
        };
        let stage = patch_stage(patch, now());
        let set = stage.get_document("$set").unwrap();

        assert_eq!(
            set.get_document("title").unwrap(),
            &doc! { "$literal": "$notAField" }
        );
        assert!(set.get("description").is_none());
        assert!(set.get("completed").is_none());
        assert!(set.contains_key("updatedAt"));
    }

    #[test]
    fn document_round_trip_keeps_millis() {
        let oid = ObjectId::new();
        let todo = Todo::create(oid.to_hex(), NewTodo::titled("Buy milk"), now());
        let doc = TodoDocument::from_todo_fields(oid, todo.clone());

        let raw = bson::to_document(&doc).unwrap();
        assert!(raw.contains_key("_id"));
        assert!(raw.contains_key("createdAt"));
        assert_eq!(raw.get_str("priority").unwrap(), "medium");

        let back: TodoDocument = bson::from_document(raw).unwrap();
        assert_eq!(back.into_todo(), todo);
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_server() {
        // No server needed: the client connects lazily and parse_id fails first.
        let store = MongoStore::connect("mongodb://localhost:27017").await.unwrap();
        assert_eq!(store.database_name(), DEFAULT_DATABASE);

        for id in ["", "123", "not-an-object-id", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            assert!(store.get(id).await.unwrap_err().is_malformed_id());
            assert!(store.delete(id).await.unwrap_err().is_malformed_id());
            assert!(store.toggle(id).await.unwrap_err().is_malformed_id());
            assert!(store
                .update(id, TodoPatch::default())
                .await
                .unwrap_err()
                .is_malformed_id());
        }
    }
}
