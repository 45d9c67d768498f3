//! Handlers for the `/todos` collection and its items.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;

use crate::AppState;
use crate::error::ApiError;
use crate::links;
use crate::model::TodoId;
use crate::representation::{self, TodoRepresentation};

type JsonBody = Result<Json<Value>, JsonRejection>;

/// Any path segment is accepted; one that cannot name a stored item is
/// simply not found.
fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<TodoRepresentation>>, ApiError> {
    let todos = state.store.list().await?;
    Ok(Json(todos.into_iter().map(TodoRepresentation::from).collect()))
}

/// Insert the item, then record its detail URL in a second write once the
/// store has assigned an id.
pub async fn create_todo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: JsonBody,
) -> Result<(StatusCode, Json<TodoRepresentation>), ApiError> {
    let Json(body) = body?;
    let new_todo = representation::parse_create(body)?;

    let inserted = state.store.insert(new_todo).await?;
    let url = links::detail_url(&state.base_url(&headers), inserted.id);
    let Some(todo) = state.store.set_url(inserted.id, &url).await? else {
        tracing::warn!(id = inserted.id, "todo deleted before its url was recorded");
        return Err(ApiError::NotFound);
    };

    tracing::debug!(id = todo.id, url = %todo.url, "created todo");
    Ok((StatusCode::CREATED, Json(todo.into())))
}

pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoRepresentation>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.store.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(todo.into()))
}

/// Serves both PUT and PATCH; only the fields present in the body change.
/// A missing item is reported before anything is said about the body.
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<TodoRepresentation>, ApiError> {
    let id = parse_id(&id)?;
    if state.store.get(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    let Json(body) = body?;
    let changes = representation::parse_update(body)?;
    let todo = state
        .store
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    tracing::debug!(id, "updated todo");
    Ok(Json(todo.into()))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}

/// Removes every todo. Unauthenticated and irreversible.
pub async fn delete_all_todos(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let removed = state.store.delete_all().await?;
    tracing::warn!(removed, "deleted all todos");
    Ok(StatusCode::NO_CONTENT)
}
