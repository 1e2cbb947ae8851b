use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{NewTodo, NewUser, Todo, User, UserChanges};
use crate::database::store::Store;

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";
const TODO_COLUMNS: &str = "id, user_id, text, done, created_at";

/// Idempotent schema bootstrap, run in order
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS todos (
        id         UUID PRIMARY KEY,
        user_id    UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        text       TEXT NOT NULL,
        done       BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS todos_user_id_idx ON todos (user_id)",
];

/// PostgreSQL-backed store over an sqlx pool
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map unique and foreign key violations onto store-level errors
fn map_write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Conflict(conflict());
        }
        if db_err.is_foreign_key_violation() {
            return DatabaseError::NotFound("Referenced user not found".to_string());
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let query = format!(
            "INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || format!("Username '{}' is already taken", user.username)))
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users ORDER BY created_at, id", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<User, DatabaseError> {
        // COALESCE keeps the stored value for fields left out of the update
        let query = format!(
            "UPDATE users
             SET username = COALESCE($2, username),
                 password_hash = COALESCE($3, password_hash),
                 updated_at = $4
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        );

        let username = changes.username.clone();
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(changes.username)
            .bind(changes.password_hash)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                map_write_error(e, || {
                    format!("Username '{}' is already taken", username.unwrap_or_default())
                })
            })?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), DatabaseError> {
        // todos go with the user through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn create_todo(&self, todo: NewTodo) -> Result<Todo, DatabaseError> {
        let query = format!(
            "INSERT INTO todos (id, user_id, text, done) VALUES ($1, $2, $3, $4) RETURNING {}",
            TODO_COLUMNS
        );

        sqlx::query_as::<_, Todo>(&query)
            .bind(Uuid::new_v4())
            .bind(todo.user_id)
            .bind(&todo.text)
            .bind(todo.done)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, || "Todo already exists".to_string()))
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, DatabaseError> {
        let query = format!("SELECT {} FROM todos ORDER BY created_at, id", TODO_COLUMNS);
        Ok(sqlx::query_as::<_, Todo>(&query).fetch_all(&self.pool).await?)
    }

    async fn list_todos_for_user(&self, user_id: Uuid) -> Result<Vec<Todo>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at, id",
            TODO_COLUMNS
        );
        Ok(sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, DatabaseError> {
        let query = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        Ok(sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("Todo {} not found", id)));
        }
        Ok(())
    }
}
