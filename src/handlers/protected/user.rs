// handlers/protected/user.rs - the caller's own account
//
// Every handler here runs behind jwt_auth_middleware, so AuthUser is the
// identity resolved from the bearer token.

use axum::extract::State;

use crate::database::models::{Todo, User};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser, NoContent};
use crate::services::UpdateUserRequest;
use crate::state::AppState;

/// GET /user
pub async fn get(State(state): State<AppState>, auth: AuthUser) -> ApiResult<User> {
    Ok(ApiResponse::ok(state.users.get(auth.id).await?))
}

/// GET /user/todo
pub async fn todos(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Vec<Todo>> {
    Ok(ApiResponse::ok(state.users.todos_of(auth.id).await?))
}

/// PUT /user - Change username and/or password
///
/// Expected Input (at least one field):
/// ```json
/// { "username": "alice2", "password": "new-password" }
/// ```
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<User> {
    Ok(ApiResponse::ok(state.users.update(auth.id, payload).await?))
}

/// DELETE /user - Remove the account and every todo it owns
///
/// Tokens already issued for the account stop working because the gate
/// can no longer resolve their subject.
pub async fn delete(State(state): State<AppState>, auth: AuthUser) -> Result<NoContent, ApiError> {
    state.users.delete(auth.id).await?;
    Ok(NoContent)
}
