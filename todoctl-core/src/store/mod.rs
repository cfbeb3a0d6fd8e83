//! Storage backends for todos
//!
//! Both backends implement [`TodoStore`]. The backend is chosen once at
//! startup from a [`StoreConfig`] and shared as `Arc<dyn TodoStore>`.
//!
//! Id-taking operations distinguish two outcomes:
//! - `Ok(None)` / `Ok(false)`: the id is well-formed but nothing matches
//! - `Err(StoreError::MalformedId)`: the id can never address a record

pub mod file;
pub mod mongo;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{ImportTodo, NewTodo, Todo, TodoFilter, TodoPatch};

pub use file::JsonFileStore;
pub use mongo::MongoStore;

/// Storage contract shared by every backend
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Backend name (e.g. "file", "mongodb")
    fn backend_type(&self) -> &'static str;

    /// Check that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// All todos matching `filter`, newest-created first
    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>>;

    /// Fetch one todo
    async fn get(&self, id: &str) -> StoreResult<Option<Todo>>;

    /// Persist a new todo and return the stored value
    async fn create(&self, new: NewTodo) -> StoreResult<Todo>;

    /// Merge `patch` into an existing todo
    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Option<Todo>>;

    /// Remove a todo; `false` if nothing matched
    async fn delete(&self, id: &str) -> StoreResult<bool>;

    /// Flip `completed` on a todo
    async fn toggle(&self, id: &str) -> StoreResult<Option<Todo>>;

    /// Remove every todo, returning how many were removed
    async fn clear(&self) -> StoreResult<u64>;

    /// Bulk insert, returning how many were inserted
    async fn import(&self, records: Vec<ImportTodo>) -> StoreResult<usize>;

    /// Release backend resources before the process exits
    async fn shutdown(&self) {}
}

/// Default MongoDB connection string
pub const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017/todoapp";

/// Default JSON data file
pub const DEFAULT_DATA_FILE: &str = "data/todos.json";

/// Which backend to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// JSON array in a single file
    File { path: PathBuf },
    /// MongoDB collection
    Mongo { uri: String },
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn mongo(uri: impl Into<String>) -> Self {
        Self::Mongo { uri: uri.into() }
    }

    /// Human-readable target for logs (credentials stripped)
    pub fn describe(&self) -> String {
        match self {
            Self::File { path } => format!("file:{}", path.display()),
            Self::Mongo { uri } => format!("mongodb:{}", mongo::redact_uri(uri)),
        }
    }
}

/// Open the configured backend and verify it is reachable.
///
/// Failing here is a startup error: the caller must not serve traffic.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn TodoStore>> {
    let store: Arc<dyn TodoStore> = match config {
        StoreConfig::File { path } => Arc::new(JsonFileStore::open(path).await?),
        StoreConfig::Mongo { uri } => Arc::new(MongoStore::connect(uri).await?),
    };

    store.ping().await?;
    tracing::info!(
        backend = store.backend_type(),
        store = %config.describe(),
        "storage backend ready"
    );
    Ok(store)
}
