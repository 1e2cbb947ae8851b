use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context attached by `jwt_auth_middleware`
#[derive(Clone, Debug, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

/// Gate for protected routes.
///
/// Verifies the bearer token, resolves its subject to a stored user and
/// injects `AuthUser` into the request. Any failure answers 401 without
/// running the handler.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = {
        let token = extract_bearer_token(request.headers()).map_err(|msg| {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), msg);
            ApiError::unauthorized(msg)
        })?;

        state.tokens.verify(token).map_err(|e| {
            tracing::warn!("Rejected {} {}: {}", request.method(), request.uri().path(), e);
            ApiError::from(e)
        })?
    };

    // A valid signature is not enough: the account must still exist
    let user = state.store.find_user(user_id).await?.ok_or_else(|| {
        tracing::warn!("Rejected token for unknown user {}", user_id);
        ApiError::unauthorized("User for this token no longer exists")
    })?;

    tracing::debug!("Authenticated {} ({})", user.username, user.id);

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .trim()
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present behind jwt_auth_middleware; absence means the route is not gated
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
