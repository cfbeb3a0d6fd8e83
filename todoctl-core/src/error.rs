/// Structured error types for todoctl-core storage.
///
/// Library code returns `StoreError`; the binary wraps it with `anyhow`
/// and the HTTP layer maps it onto status codes.

use std::io;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Error raised by a [`TodoStore`](crate::store::TodoStore) backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Filesystem read or write failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Stored data could not be (de)serialized
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// The id can never address a record in this backend
    #[error("Malformed id '{id}'")]
    MalformedId { id: String },

    /// Document store request failed
    #[error("MongoDB error: {source}")]
    Mongo {
        #[from]
        source: mongodb::error::Error,
    },

    /// A bulk-load record failed field validation
    #[error("Invalid record at index {index}: {source}")]
    InvalidRecord {
        index: usize,
        source: ValidationErrors,
    },

    /// Backend could not be reached or configured
    #[error("Connection error: {reason}")]
    Connection { reason: String },
}

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed id error
    pub fn malformed_id(id: impl Into<String>) -> Self {
        Self::MalformedId { id: id.into() }
    }

    /// Create a connection error
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection {
            reason: reason.into(),
        }
    }

    /// True when the error means "no such record" rather than a backend failure
    pub fn is_malformed_id(&self) -> bool {
        matches!(self, Self::MalformedId { .. })
    }
}
