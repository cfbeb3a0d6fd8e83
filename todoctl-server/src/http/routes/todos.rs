//! Todo endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todoctl_core::{validate_create, validate_update, Priority, Todo, TodoFilter, TodoStats};

use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::response::Envelope;
use crate::state::AppState;

/// Query string for `GET /api/todos`. Unrecognized values mean "no filter".
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl ListParams {
    pub fn filter(&self) -> TodoFilter {
        let completed = match self.status.as_deref() {
            Some("completed") => Some(true),
            Some("pending") => Some(false),
            _ => None,
        };
        let priority = self
            .priority
            .as_deref()
            .and_then(|p| p.parse::<Priority>().ok());

        TodoFilter {
            completed,
            priority,
        }
    }
}

/// Data returned by a successful delete
#[derive(Debug, Serialize)]
pub struct DeletedTodo {
    pub id: String,
    pub title: String,
}

/// GET /api/todos - list todos, newest first
async fn list_todos(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<Todo>>>, ApiError> {
    let filter = params.filter();
    let todos = state
        .store()
        .list(&filter)
        .await
        .map_err(ApiError::store("fetch todos"))?;

    let count = todos.len();
    Ok(Json(Envelope::ok(todos).with_count(count)))
}

/// GET /api/todos/{id}
async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, ApiError> {
    let todo = state
        .store()
        .get(&id)
        .await
        .map_err(ApiError::store("fetch todo"))?
        .ok_or_else(|| ApiError::not_found(&id))?;

    Ok(Json(Envelope::ok(todo)))
}

/// POST /api/todos
async fn create_todo(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Envelope<Todo>>), ApiError> {
    let new = validate_create(&body)?;
    let todo = state
        .store()
        .create(new)
        .await
        .map_err(ApiError::store("create todo"))?;

    tracing::debug!(id = %todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(todo).with_message("Todo created successfully")),
    ))
}

/// PUT /api/todos/{id} - partial update
async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Envelope<Todo>>, ApiError> {
    let changes = validate_update(&body)?;
    let todo = state
        .store()
        .update(&id, changes)
        .await
        .map_err(ApiError::store("update todo"))?
        .ok_or_else(|| ApiError::not_found(&id))?;

    Ok(Json(
        Envelope::ok(todo).with_message("Todo updated successfully"),
    ))
}

/// PATCH /api/todos/{id}/toggle
async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Todo>>, ApiError> {
    let todo = state
        .store()
        .toggle(&id)
        .await
        .map_err(ApiError::store("toggle todo"))?
        .ok_or_else(|| ApiError::not_found(&id))?;

    let message = if todo.completed {
        "Todo marked as completed"
    } else {
        "Todo marked as pending"
    };
    Ok(Json(Envelope::ok(todo).with_message(message)))
}

/// DELETE /api/todos/{id}
async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeletedTodo>>, ApiError> {
    let store = state.store();
    let todo = store
        .get(&id)
        .await
        .map_err(ApiError::store("delete todo"))?
        .ok_or_else(|| ApiError::not_found(&id))?;

    // Someone else may have removed it between the read and the delete
    if !store
        .delete(&id)
        .await
        .map_err(ApiError::store("delete todo"))?
    {
        return Err(ApiError::not_found(&id));
    }

    tracing::debug!(%id, "todo deleted");
    Ok(Json(
        Envelope::ok(DeletedTodo {
            id,
            title: todo.title,
        })
        .with_message("Todo deleted successfully"),
    ))
}

/// GET /api/todos/stats/summary
async fn stats_summary(State(state): State<AppState>) -> Result<Json<Envelope<TodoStats>>, ApiError> {
    let todos = state
        .store()
        .list(&TodoFilter::default())
        .await
        .map_err(ApiError::store("fetch statistics"))?;

    Ok(Json(Envelope::ok(TodoStats::from_todos(&todos))))
}

/// Todo routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/stats/summary", get(stats_summary))
        .route(
            "/api/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/api/todos/{id}/toggle", patch(toggle_todo))
}
