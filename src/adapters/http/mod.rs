//! HTTP adapter - axum boundary for sessions and subscriptions.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::{ApiError, AppState};
pub use routes::app_router;
