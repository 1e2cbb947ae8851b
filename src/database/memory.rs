use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, User, UserChanges};
use crate::database::store::Store;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    todos: Vec<Todo>,
}

/// Process-local store selected by `memory://`. Contents vanish on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(username: &str) -> DatabaseError {
    DatabaseError::Conflict(format!("Username '{}' is already taken", username))
}

#[async_trait]
impl Store for MemoryStore {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(username_taken(&user.username));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;

        if let Some(username) = &changes.username {
            if tables.users.iter().any(|u| u.id != id && &u.username == username) {
                return Err(username_taken(username));
            }
        }

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))?;

        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password_hash) = changes.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        tables.todos.retain(|t| t.user_id != id);
        Ok(())
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, DatabaseError> {
        let mut tables = self.tables.write().await;
        // Mirror the foreign key the SQL schema enforces
        if !tables.users.iter().any(|u| u.id == todo.user_id) {
            return Err(DatabaseError::NotFound(format!("User {} not found", todo.user_id)));
        }

        let todo = Todo {
            id: Uuid::new_v4(),
            user_id: todo.user_id,
            text: todo.text,
            done: todo.done,
            created_at: Utc::now(),
        };
        tables.todos.push(todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        Ok(self.tables.read().await.todos.clone())
    }

    async fn list_todos_for_user(&self, user_id: Uuid) -> Result<Vec<Todo>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.todos.iter().filter(|t| t.user_id == user_id).cloned().collect())
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.todos.iter().find(|t| t.id == id).cloned())
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let before = tables.todos.len();
        tables.todos.retain(|t| t.id != id);
        if tables.todos.len() == before {
            return Err(DatabaseError::NotFound(format!("Todo {} not found", id)));
        }
        Ok(())
    }
}
