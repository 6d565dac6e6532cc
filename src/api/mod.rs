//! HTTP API module for item, health, and metrics endpoints.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, ServiceInfo};
pub use routes::create_router;
