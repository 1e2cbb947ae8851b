// handlers/public/todo.rs - GET /todo

use axum::extract::State;

use crate::database::models::Todo;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /todo - List todos of every user, oldest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Todo>> {
    Ok(ApiResponse::ok(state.todos.list_all().await?))
}
