//! Todo data model
//!
//! `Todo` is the canonical stored shape. The input types (`NewTodo`,
//! `TodoPatch`, `ImportTodo`) only carry what a caller is allowed to set.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Maximum title length in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Current time truncated to milliseconds.
///
/// BSON dates only carry milliseconds, so both backends store this
/// resolution to keep `get(create(x).id) == create(x)`.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Fixed-width `2024-01-01T00:00:00.000Z` timestamps
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }
}

/// Todo priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of `low`, `medium`, `high`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPriority(pub String);

impl fmt::Display for UnknownPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown priority '{}'", self.0)
    }
}

impl std::error::Error for UnknownPriority {}

impl FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(UnknownPriority(other.to_owned())),
        }
    }
}

/// A stored todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Build a fresh todo with the given id; both timestamps are `now`.
    pub fn create(id: String, new: NewTodo, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            completed: false,
            priority: new.priority,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a todo from an import record.
    pub fn import(id: String, record: ImportTodo, now: DateTime<Utc>) -> Self {
        let (created_at, updated_at) = record.timestamps(now);
        Self {
            id,
            title: record.title,
            description: record.description,
            completed: record.completed,
            priority: record.priority,
            created_at,
            updated_at,
        }
    }

    /// Merge the supplied fields and refresh `updated_at`.
    pub fn apply(&mut self, patch: TodoPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        self.touch(now);
    }

    /// Flip `completed` and refresh `updated_at`.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.completed = !self.completed;
        self.touch(now);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}

/// Validated input for creating a todo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

impl NewTodo {
    /// New todo with default description and priority.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Validated partial update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.completed.is_none()
            && self.priority.is_none()
    }
}

/// List filter; `None` fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TodoFilter {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            priority: None,
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            completed: None,
            priority: Some(priority),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        self.completed.map_or(true, |c| todo.completed == c)
            && self.priority.map_or(true, |p| todo.priority == p)
    }
}

/// Record for bulk loading (seed files, generated fixtures)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTodo {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub priority: Priority,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ImportTodo {
    /// Resolve timestamps: missing values default to `now`, sub-millisecond
    /// precision is dropped and `updated_at` never precedes `created_at`.
    pub fn timestamps(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let created_at = self.created_at.unwrap_or(now).trunc_subsecs(3);
        let updated_at = self
            .updated_at
            .unwrap_or(created_at)
            .trunc_subsecs(3)
            .max(created_at);
        (created_at, updated_at)
    }
}

impl From<NewTodo> for ImportTodo {
    fn from(new: NewTodo) -> Self {
        Self {
            title: new.title,
            description: new.description,
            completed: false,
            priority: new.priority,
            created_at: None,
            updated_at: None,
        }
    }
}
