//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token validation and extractors
//! - `capability` - Per-route capability gates

pub mod auth;
pub mod capability;

pub use auth::{auth_middleware, bearer_token, AuthRejection, AuthState, BearerToken, RequireAuth};
pub use capability::{denial_response, require_capability, CapabilityGate};
