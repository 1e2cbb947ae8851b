// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, registration and the read-only listings.
// Middleware: none beyond the global layers.

pub mod health;
pub mod todo;
pub mod user;

pub use health::health;
