//! Summary statistics over a fetched todo list

use serde::{Deserialize, Serialize};

use crate::model::{Priority, Todo};

/// Per-priority counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

/// Aggregated view returned by `GET /api/todos/stats/summary`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Percentage of completed todos, rounded half up; 0 when empty
    pub completion_rate: u32,
    pub by_priority: PriorityCounts,
}

impl TodoStats {
    pub fn from_todos(todos: &[Todo]) -> Self {
        let mut stats = Self {
            total: todos.len(),
            ..Self::default()
        };

        for todo in todos {
            if todo.completed {
                stats.completed += 1;
            }
            match todo.priority {
                Priority::High => stats.by_priority.high += 1,
                Priority::Medium => stats.by_priority.medium += 1,
                Priority::Low => stats.by_priority.low += 1,
            }
        }

        stats.pending = stats.total - stats.completed;
        stats.completion_rate = percentage(stats.completed, stats.total);
        stats
    }
}

/// `round(part / total * 100)`, 0 when `total` is 0
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
