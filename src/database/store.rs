use async_trait::async_trait;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, User, UserChanges};

/// Persistence seam for users and todos.
///
/// Implementations own their own synchronization; callers share a store
/// through `Arc<dyn Store>`. Listing methods return rows in creation order.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create tables if they do not exist yet
    async fn migrate(&self) -> Result<(), DatabaseError>;

    /// Cheap round trip used by `/health`
    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Fails with `Conflict` when the username is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Fails with `NotFound` for an unknown id and `Conflict` for a taken username
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, DatabaseError>;

    /// Removes the user together with every todo they own
    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError>;

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, DatabaseError>;

    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError>;

    async fn list_todos_for_user(&self, user_id: Uuid) -> Result<Vec<Todo>, DatabaseError>;

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError>;

    async fn delete_todo(&self, id: Uuid) -> Result<(), DatabaseError>;
}
