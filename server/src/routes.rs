//! Route table and handlers for the todo API.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use todo_core::{CreateTodo, MoveTodo, Todo};

use crate::config::normalize_prefix;
use crate::error::AppError;
use crate::extract::Payload;
use crate::store::TodoStore;

/// Build the todo routes under `prefix` plus `/health` at the root.
pub fn router(store: TodoStore, prefix: &str) -> Router {
    let todos = Router::new()
        .route("/todo", get(list_todos).post(create_todo))
        .route("/todo/", get(list_todos).post(create_todo))
        .route("/todo/complete", put(complete_all))
        .route("/todo/{id}", put(update_todo).delete(delete_todo))
        .route("/todo/{id}/reorder", put(reorder_todo));

    let prefix = normalize_prefix(prefix);
    let api = if prefix.is_empty() {
        todos
    } else {
        Router::new().nest(&prefix, todos)
    };

    api.route("/health", get(health)).with_state(store)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_todos(State(store): State<TodoStore>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store.list().await?))
}

async fn create_todo(
    State(store): State<TodoStore>,
    Payload(input): Payload<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    let todo = store.create(input.text.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// With `new_position` this reorders and returns the list; without it the
/// item's completion is toggled and the item returned.
async fn update_todo(
    State(store): State<TodoStore>,
    Path(id): Path<i64>,
    Payload(input): Payload<MoveTodo>,
) -> Result<Response, AppError> {
    match input.new_position {
        Some(new_position) => Ok(Json(store.reorder(id, new_position).await?).into_response()),
        None => Ok(Json(store.toggle(id).await?).into_response()),
    }
}

async fn complete_all(State(store): State<TodoStore>) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(store.complete_all().await?))
}

async fn reorder_todo(
    State(store): State<TodoStore>,
    Path(id): Path<i64>,
    Payload(input): Payload<MoveTodo>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let new_position = input
        .new_position
        .ok_or_else(|| AppError::Validation("new_position is required".to_string()))?;
    Ok(Json(store.reorder(id, new_position).await?))
}

async fn delete_todo(
    State(store): State<TodoStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
