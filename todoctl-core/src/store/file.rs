//! JSON file backend
//!
//! The whole collection lives in one JSON array. Every mutation loads the
//! array, applies the change and rewrites the file through a temp file +
//! rename, so readers never observe a partial write.
//!
//! Mutations are serialized by an in-process mutex. Other processes writing
//! the same file are not coordinated: the last full rewrite wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::TodoStore;
use crate::error::{StoreError, StoreResult};
use crate::model::{now, ImportTodo, NewTodo, Todo, TodoFilter, TodoPatch};

/// Longest id accepted for lookups
const MAX_ID_LEN: usize = 64;

/// Todos persisted as a JSON array in a single file
pub struct JsonFileStore {
    path: PathBuf,
    gate: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating the file (and parent directories) as `[]`
    /// if it does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            gate: Mutex::new(()),
        };
        store.ensure_file().await?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file as `[]` if missing. Callers other than `open` must
    /// hold `gate`, since this writes through the shared temp path.
    async fn ensure_file(&self) -> StoreResult<()> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        tracing::info!(path = %self.path.display(), "initializing empty todo file");
        self.save(&[]).await
    }

    /// Load the collection, failing on any I/O or parse error. A missing
    /// file is an empty collection; loading never writes.
    async fn load(&self) -> StoreResult<Vec<Todo>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| StoreError::json(self.path.display().to_string(), e))
    }

    /// Load the collection for a read; failures degrade to an empty view.
    async fn load_or_empty(&self) -> Vec<Todo> {
        match self.load().await {
            Ok(todos) => todos,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read todo file, treating as empty"
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(todos)
            .map_err(|e| StoreError::json("serializing todos", e))?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    /// Run one read-modify-write cycle under the gate.
    ///
    /// `apply` returns the operation result and whether the collection
    /// changed; the file is only rewritten when it did.
    async fn mutate<R, F>(&self, apply: F) -> StoreResult<R>
    where
        F: FnOnce(&mut Vec<Todo>) -> (R, bool) + Send,
        R: Send,
    {
        let _guard = self.gate.lock().await;
        self.ensure_file().await?;
        let mut todos = self.load().await?;
        let (result, changed) = apply(&mut todos);
        if changed {
            self.save(&todos).await?;
        }
        Ok(result)
    }
}

/// Ids are opaque: non-empty, bounded, `[A-Za-z0-9_-]` only.
fn check_id(id: &str) -> StoreResult<()> {
    let well_formed = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if well_formed {
        Ok(())
    } else {
        Err(StoreError::malformed_id(id))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[async_trait]
impl TodoStore for JsonFileStore {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn ping(&self) -> StoreResult<()> {
        let _guard = self.gate.lock().await;
        self.ensure_file().await
    }

    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        let mut todos: Vec<Todo> = self
            .load_or_empty()
            .await
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();

        // Newest first; ties keep the later-inserted record first
        todos.reverse();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Todo>> {
        check_id(id)?;
        Ok(self.load_or_empty().await.into_iter().find(|t| t.id == id))
    }

    async fn create(&self, new: NewTodo) -> StoreResult<Todo> {
        let todo = Todo::create(new_id(), new, now());
        let stored = todo.clone();
        self.mutate(move |todos| {
            todos.push(todo);
            ((), true)
        })
        .await?;

        tracing::debug!(id = %stored.id, "todo created");
        Ok(stored)
    }

    async fn update(&self, id: &str, patch: TodoPatch) -> StoreResult<Option<Todo>> {
        check_id(id)?;
        let at = now();
        self.mutate(|todos| match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.apply(patch, at);
                (Some(todo.clone()), true)
            }
            None => (None, false),
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        check_id(id)?;
        self.mutate(|todos| {
            let before = todos.len();
            todos.retain(|t| t.id != id);
            let removed = todos.len() != before;
            (removed, removed)
        })
        .await
    }

    async fn toggle(&self, id: &str) -> StoreResult<Option<Todo>> {
        check_id(id)?;
        let at = now();
        self.mutate(|todos| match todos.iter_mut().find(|t| t.id == id) {
            Some(todo) => {
                todo.toggle(at);
                (Some(todo.clone()), true)
            }
            None => (None, false),
        })
        .await
    }

    async fn clear(&self) -> StoreResult<u64> {
        let removed = self
            .mutate(|todos| {
                let count = todos.len();
                todos.clear();
                (count, true)
            })
            .await?;
        Ok(removed as u64)
    }

    async fn import(&self, records: Vec<ImportTodo>) -> StoreResult<usize> {
        let at = now();
        let count = records.len();
        let imported: Vec<Todo> = records
            .into_iter()
            .map(|record| Todo::import(new_id(), record, at))
            .collect();

        self.mutate(move |todos| {
            todos.extend(imported);
            (count, count > 0)
        })
        .await
    }
}
