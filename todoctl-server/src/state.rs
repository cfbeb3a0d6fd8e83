//! Application state shared across handlers

use std::sync::Arc;

use chrono::{DateTime, Utc};
use todoctl_core::TodoStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn TodoStore>,
    started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                started_at: Utc::now(),
            }),
        }
    }

    pub fn store(&self) -> &dyn TodoStore {
        self.inner.store.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}
