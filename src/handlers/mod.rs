// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) and Protected (bearer token required). The router in
// server.rs decides which tier a route belongs to.

pub mod protected;
pub mod public;
