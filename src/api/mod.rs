//! HTTP surface: shared state, handlers, and router assembly.

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
