use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::TokenService;
use crate::database::models::{NewUser, Todo, User, UserChanges};
use crate::database::Store;
use crate::error::ApiError;
use crate::services::validation::{validate_password, validate_username_format};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub user: User,
}

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Hashed once per service and checked against on unknown usernames
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Registration, login and self-service profile operations
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<TokenService>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, ApiError> {
        let username = request.username.trim().to_string();
        validate_username_format(&username).map_err(|e| ApiError::invalid_field("username", e))?;
        validate_password(&request.password).map_err(|e| ApiError::invalid_field("password", e))?;

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let user = self
            .store
            .create_user(NewUser {
                username,
                password_hash,
            })
            .await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Unknown usernames and wrong passwords are indistinguishable to the caller
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let username = request.username.trim();
        if username.is_empty() || request.password.is_empty() {
            return Err(ApiError::validation_error("Username and password are required", None));
        }

        let Some(user) = self.store.find_user_by_username(username).await? else {
            // Pay the same bcrypt cost as a wrong password
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| hash_password(DUMMY_PASSWORD.to_string(), self.bcrypt_cost))
                .await?;
            verify_password(request.password, dummy.clone()).await?;

            tracing::warn!("Login failed for unknown user '{}'", username);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(request.password, user.password_hash.clone()).await? {
            tracing::warn!("Login failed for user {} ({}): bad password", user.username, user.id);
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }

        let issued = self.tokens.issue(&user)?;
        tracing::info!("User {} ({}) logged in", user.username, user.id);

        Ok(LoginResponse {
            token: issued.token,
            token_type: "Bearer",
            expires_in: issued.expires_in,
            expires_at: issued.expires_at,
            user,
        })
    }

    pub async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.store.list_users().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ApiError> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))
    }

    pub async fn todos_of(&self, id: Uuid) -> Result<Vec<Todo>, ApiError> {
        Ok(self.store.list_todos_for_user(id).await?)
    }

    pub async fn update(&self, id: Uuid, request: UpdateUserRequest) -> Result<User, ApiError> {
        let mut changes = UserChanges::default();

        if let Some(username) = request.username {
            let username = username.trim().to_string();
            validate_username_format(&username).map_err(|e| ApiError::invalid_field("username", e))?;
            changes.username = Some(username);
        }

        if let Some(password) = request.password {
            validate_password(&password).map_err(|e| ApiError::invalid_field("password", e))?;
            changes.password_hash = Some(hash_password(password, self.bcrypt_cost).await?);
        }

        if changes.is_empty() {
            return Err(ApiError::validation_error(
                "Provide at least one of: username, password",
                None,
            ));
        }

        let user = self.store.update_user(id, changes).await?;
        tracing::info!("Updated user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.store.delete_user(id).await?;
        tracing::info!("Deleted user {} and their todos", id);
        Ok(())
    }
}
