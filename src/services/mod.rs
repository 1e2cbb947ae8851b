pub mod todo_service;
pub mod user_service;
pub mod validation;

pub use todo_service::{CreateTodoRequest, TodoService};
pub use user_service::{LoginRequest, LoginResponse, RegisterRequest, UpdateUserRequest, UserService};
