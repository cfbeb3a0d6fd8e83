//! todoctl-core: todo model, validation and storage backends
//!
//! - [`model`]: the `Todo` entity and its input types
//! - [`validation`]: per-field checks for create/update payloads
//! - [`store`]: the [`TodoStore`] contract with JSON-file and MongoDB backends
//! - [`stats`]: summary counts over a todo list
//! - [`fixtures`]: seed files and generated data

pub mod error;
pub mod fixtures;
pub mod model;
pub mod stats;
pub mod store;
pub mod validation;

pub use error::{StoreError, StoreResult};
pub use model::{ImportTodo, NewTodo, Priority, Todo, TodoFilter, TodoPatch};
pub use stats::TodoStats;
pub use store::{open_store, JsonFileStore, MongoStore, StoreConfig, TodoStore};
pub use validation::{
    validate_create, validate_import, validate_update, FieldViolation, ValidationErrors,
};
