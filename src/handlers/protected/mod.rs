// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Mounted behind jwt_auth_middleware. Handlers take `AuthUser` and act only
// on resources owned by that identity.

pub mod todo;
pub mod user;
