// handlers/protected/todo.rs - owner-scoped todo mutations

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::Todo;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, AuthUser, NoContent};
use crate::services::CreateTodoRequest;
use crate::state::AppState;

/// POST /todo - Create a todo owned by the caller
///
/// Expected Input:
/// ```json
/// { "text": "buy milk", "done": false }
/// ```
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateTodoRequest>,
) -> Result<ApiResponse<Todo>, ApiError> {
    let todo = state.todos.create(auth.id, payload).await?;
    Ok(ApiResponse::created(todo))
}

/// DELETE /todo/:id - 404 if absent, 403 unless the caller owns it
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<NoContent, ApiError> {
    state.todos.delete(auth.id, id).await?;
    Ok(NoContent)
}
