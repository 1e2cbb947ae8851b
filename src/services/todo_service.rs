use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{NewTodo, Todo};
use crate::database::Store;
use crate::error::ApiError;
use crate::services::validation::normalize_todo_text;

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Todo use-cases; mutations are owner-scoped
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn Store>,
}

impl TodoService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner: Uuid, request: CreateTodoRequest) -> Result<Todo, ApiError> {
        let text = normalize_todo_text(&request.text).map_err(|e| ApiError::invalid_field("text", e))?;

        let todo = self
            .store
            .create_todo(NewTodo {
                user_id: owner,
                text,
                done: request.done,
            })
            .await?;

        tracing::debug!("User {} created todo {}", owner, todo.id);
        Ok(todo)
    }

    pub async fn list_all(&self) -> Result<Vec<Todo>, ApiError> {
        Ok(self.store.list_todos().await?)
    }

    /// 404 when the todo is missing, 403 when `actor` does not own it
    pub async fn delete(&self, actor: Uuid, id: Uuid) -> Result<(), ApiError> {
        let todo = self
            .store
            .find_todo(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Todo {} not found", id)))?;

        if todo.user_id != actor {
            tracing::warn!("User {} attempted to delete todo {} owned by {}", actor, id, todo.user_id);
            return Err(ApiError::forbidden("You do not own this todo"));
        }

        self.store.delete_todo(id).await?;
        tracing::debug!("User {} deleted todo {}", actor, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::MemoryStore;
    use axum::http::StatusCode;

    async fn setup() -> (TodoService, Uuid, Uuid) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = store
                .create_user(NewUser {
                    username: name.to_string(),
                    password_hash: "hash".to_string(),
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        (TodoService::new(store), ids[0], ids[1])
    }

    fn request(text: &str) -> CreateTodoRequest {
        CreateTodoRequest {
            text: text.to_string(),
            done: false,
        }
    }

    #[tokio::test]
    async fn create_trims_and_assigns_owner() {
        let (todos, alice, _) = setup().await;
        let todo = todos.create(alice, request("  write tests  ")).await.unwrap();

        assert_eq!(todo.text, "write tests");
        assert_eq!(todo.user_id, alice);
        assert!(!todo.done);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let (todos, alice, _) = setup().await;
        let err = todos.create(alice, request("   ")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let (todos, alice, bob) = setup().await;
        let todo = todos.create(alice, request("alice's todo")).await.unwrap();

        let err = todos.delete(bob, todo.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(todos.list_all().await.unwrap().len(), 1);

        todos.delete(alice, todo.id).await.unwrap();
        assert!(todos.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_missing_todo_is_not_found() {
        let (todos, alice, _) = setup().await;
        let err = todos.delete(alice, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
