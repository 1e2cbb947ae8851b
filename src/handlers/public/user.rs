// handlers/public/user.rs - registration, login and user listing

use axum::extract::State;

use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;

/// POST /user - Register a new account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "at-least-8-chars" }
/// ```
///
/// Responds 201 with the stored user (never the password hash), 400 for
/// invalid input and 409 when the username is taken.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = state.users.register(payload).await?;
    Ok(ApiResponse::created(user))
}

/// POST /user/login - Exchange credentials for a bearer token
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "token_type": "Bearer",
///     "expires_in": 259200,
///     "expires_at": "2026-01-01T00:00:00Z",
///     "user": { "id": "user_uuid", "username": "alice", ... }
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::ok(state.users.login(payload).await?))
}

/// GET /users - List every registered user
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::ok(state.users.list().await?))
}
