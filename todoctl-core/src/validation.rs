//! Request payload validation
//!
//! Payloads arrive as raw JSON so every problem can be reported per field,
//! including wrong types and fields that are not allowed at all.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ImportTodo, NewTodo, Priority, TodoPatch, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};

const CREATE_FIELDS: &[&str] = &["title", "description", "priority"];
const UPDATE_FIELDS: &[&str] = &["title", "description", "completed", "priority"];

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All violations found in one payload (never empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// True if any violation names `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.violations.iter().map(|v| v.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects violations while fields are checked
#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(field, message));
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.violations.is_empty() {
            Ok(value)
        } else {
            Err(ValidationErrors {
                violations: self.violations,
            })
        }
    }

    fn object<'a>(&mut self, body: &'a Value, allowed: &[&str]) -> Option<&'a Map<String, Value>> {
        let Some(map) = body.as_object() else {
            self.reject("body", "Request body must be a JSON object");
            return None;
        };
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.reject(key, format!("{} is not allowed", key));
            }
        }
        Some(map)
    }

    fn required_title(&mut self, map: &Map<String, Value>) -> Option<String> {
        match map.get("title") {
            Some(Value::Null) | None => {
                self.reject("title", "Title is required");
                None
            }
            Some(value) => self.title(value, "Title is required"),
        }
    }

    fn title(&mut self, value: &Value, empty_message: &str) -> Option<String> {
        let Some(raw) = value.as_str() else {
            self.reject("title", "Title must be a string");
            return None;
        };
        let title = raw.trim();
        if title.is_empty() {
            self.reject("title", empty_message);
            return None;
        }
        if title.chars().count() > MAX_TITLE_LEN {
            self.reject(
                "title",
                format!("Title must be at most {} characters", MAX_TITLE_LEN),
            );
            return None;
        }
        Some(title.to_owned())
    }

    fn description(&mut self, value: &Value) -> Option<String> {
        let Some(description) = value.as_str() else {
            self.reject("description", "Description must be a string");
            return None;
        };
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            self.reject(
                "description",
                format!(
                    "Description must be at most {} characters",
                    MAX_DESCRIPTION_LEN
                ),
            );
            return None;
        }
        Some(description.to_owned())
    }

    fn priority(&mut self, value: &Value) -> Option<Priority> {
        match value.as_str().map(str::parse::<Priority>) {
            Some(Ok(priority)) => Some(priority),
            _ => {
                self.reject("priority", "Priority must be one of: low, medium, high");
                None
            }
        }
    }

    fn completed(&mut self, value: &Value) -> Option<bool> {
        let completed = value.as_bool();
        if completed.is_none() {
            self.reject("completed", "Completed must be a boolean");
        }
        completed
    }
}

/// Validate a create payload: `title` required, `description` and
/// `priority` optional.
pub fn validate_create(body: &Value) -> Result<NewTodo, ValidationErrors> {
    let mut check = Checker::default();
    let Some(map) = check.object(body, CREATE_FIELDS) else {
        return check.finish(NewTodo::titled(""));
    };

    let title = check.required_title(map);
    let description = map
        .get("description")
        .and_then(|v| check.description(v))
        .unwrap_or_default();
    let priority = map
        .get("priority")
        .and_then(|v| check.priority(v))
        .unwrap_or_default();

    let new = NewTodo {
        title: title.unwrap_or_default(),
        description,
        priority,
    };
    check.finish(new)
}

/// Validate a partial update payload. An empty object is a valid no-op patch.
pub fn validate_update(body: &Value) -> Result<TodoPatch, ValidationErrors> {
    let mut check = Checker::default();
    let Some(map) = check.object(body, UPDATE_FIELDS) else {
        return check.finish(TodoPatch::default());
    };

    let patch = TodoPatch {
        title: map
            .get("title")
            .and_then(|v| check.title(v, "Title cannot be empty")),
        description: map.get("description").and_then(|v| check.description(v)),
        completed: map.get("completed").and_then(|v| check.completed(v)),
        priority: map.get("priority").and_then(|v| check.priority(v)),
    };
    check.finish(patch)
}

/// Validate one bulk-load record (seed file entry).
///
/// Same field rules as [`validate_create`], plus an optional `completed`.
/// Other keys such as `id` or timestamps are ignored; imports always get
/// fresh ids and timestamps.
pub fn validate_import(record: &Value) -> Result<ImportTodo, ValidationErrors> {
    let mut check = Checker::default();
    let Some(map) = record.as_object() else {
        check.reject("body", "Record must be a JSON object");
        return check.finish(ImportTodo::from(NewTodo::titled("")));
    };

    let present = |key: &str| map.get(key).filter(|v| !v.is_null());
    let title = check.required_title(map);
    let description = present("description")
        .and_then(|v| check.description(v))
        .unwrap_or_default();
    let completed = present("completed")
        .and_then(|v| check.completed(v))
        .unwrap_or(false);
    let priority = present("priority")
        .and_then(|v| check.priority(v))
        .unwrap_or_default();

    check.finish(ImportTodo {
        title: title.unwrap_or_default(),
        description,
        completed,
        priority,
        created_at: None,
        updated_at: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_applies_defaults() {
        let new = validate_create(&json!({ "title": "Buy milk" })).unwrap();
        assert_eq!(new, NewTodo::titled("Buy milk"));
    }

    #[test]
    fn create_trims_title() {
        let new = validate_create(&json!({ "title": "  padded  " })).unwrap();
        assert_eq!(new.title, "padded");
    }

    #[test]
    fn create_requires_title() {
        let err = validate_create(&json!({ "description": "no title" })).unwrap_err();
        assert!(err.has_field("title"));

        let err = validate_create(&json!({ "title": "   " })).unwrap_err();
        assert_eq!(err.violations()[0].message, "Title is required");
    }

    #[test]
    fn title_length_boundary() {
        assert!(validate_create(&json!({ "title": "a".repeat(200) })).is_ok());

        let err = validate_create(&json!({ "title": "a".repeat(201) })).unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert_eq!(err.violations()[0].field, "title");
    }

    #[test]
    fn description_length_boundary() {
        let ok = json!({ "title": "t", "description": "d".repeat(1000) });
        assert!(validate_create(&ok).is_ok());

        let too_long = json!({ "title": "t", "description": "d".repeat(1001) });
        assert!(validate_create(&too_long).unwrap_err().has_field("description"));
    }

    #[test]
    fn rejects_unknown_priority() {
        let err = validate_create(&json!({ "title": "t", "priority": "urgent" })).unwrap_err();
        assert!(err.has_field("priority"));
    }

    #[test]
    fn collects_every_violation() {
        let body = json!({ "title": "", "priority": 3, "owner": "me" });
        let err = validate_create(&body).unwrap_err();
        assert!(err.has_field("title"));
        assert!(err.has_field("priority"));
        assert!(err.has_field("owner"));
    }

    #[test]
    fn update_rejects_immutable_fields() {
        let err = validate_update(&json!({ "id": "x", "createdAt": "2024-01-01" })).unwrap_err();
        assert!(err.has_field("id"));
        assert!(err.has_field("createdAt"));
    }

    #[test]
    fn update_accepts_partial_and_empty() {
        let patch = validate_update(&json!({ "completed": true })).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert!(patch.title.is_none());

        assert!(validate_update(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn update_rejects_empty_title_and_bad_types() {
        let err = validate_update(&json!({ "title": "", "completed": "yes" })).unwrap_err();
        assert_eq!(err.violations()[0].message, "Title cannot be empty");
        assert!(err.has_field("completed"));
    }

    #[test]
    fn import_ignores_foreign_keys_but_checks_fields() {
        let record = json!({ "id": "1", "title": " Walk ", "completed": true, "createdAt": "x" });
        let todo = validate_import(&record).unwrap();
        assert_eq!(todo.title, "Walk");
        assert!(todo.completed);
        assert!(todo.created_at.is_none());

        let err = validate_import(&json!({ "title": "t", "description": "d".repeat(1001) }))
            .unwrap_err();
        assert!(err.has_field("description"));
        assert!(validate_import(&json!("title")).unwrap_err().has_field("body"));
    }

    #[test]
    fn rejects_non_object_body() {
        let err = validate_update(&json!(["title"])).unwrap_err();
        assert!(err.has_field("body"));
    }
}
