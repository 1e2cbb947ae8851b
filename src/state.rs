use std::sync::Arc;

use crate::auth::{TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::{TodoService, UserService};

/// Shared, read-only handles cloned into every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub users: UserService,
    pub todos: TodoService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenService::from_config(&config.security)?);
        let users = UserService::new(store.clone(), tokens.clone(), config.security.bcrypt_cost);
        let todos = TodoService::new(store.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            users,
            todos,
        })
    }
}
