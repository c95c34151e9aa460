//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - validates Bearer tokens and injects claims into extensions
//! - `RequireAuth` - extractor that requires a validated caller
//!
//! ```text
//! Request → auth_middleware → injects TokenClaims + BearerToken into extensions
//!                                      ↓
//!                              Handler → RequireAuth reads from extensions
//! ```
//!
//! A request without an `Authorization` header passes through untouched;
//! capability gates and extractors decide whether that is acceptable. A
//! header carrying a token that fails validation is rejected here with 401.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::TokenService;
use crate::domain::access::AccessDenial;
use crate::domain::foundation::TokenClaims;

use super::super::dto::ErrorResponse;

/// Auth middleware state.
pub type AuthState = Arc<TokenService>;

/// The raw token the caller presented, kept for logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates Bearer tokens.
pub async fn auth_middleware(
    State(tokens): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        return next.run(request).await;
    };

    match tokens.validate(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            request.extensions_mut().insert(BearerToken(token));
            next.run(request).await
        }
        Err(reason) => {
            tracing::warn!(reason = reason.reason(), "Rejected bearer token");
            let denial = AccessDenial::from(reason);
            let body = ErrorResponse::with_details(
                denial.code().to_string(),
                denial.user_message(),
                serde_json::json!({ "reason": reason.reason() }),
            );
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

/// Extractor that requires a validated caller.
///
/// ```ignore
/// async fn my_handler(RequireAuth(claims): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", claims.subject())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid authentication token was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let denial = match self {
            AuthRejection::Unauthenticated => AccessDenial::Unauthenticated,
        };
        let body = ErrorResponse::new(denial.code().to_string(), denial.user_message());
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
