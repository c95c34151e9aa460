//! Capability gate middleware.
//!
//! Runs after `auth_middleware` and asks the `AccessGuard` whether the
//! caller holds the route's capability.
//!
//! | Denial | Status |
//! |--------|--------|
//! | Unauthenticated, InvalidToken | 401 |
//! | InsufficientRole | 403 |
//! | SubscriptionInactive | 402 |
//! | storage failure | 503 / 500 |

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::AccessGuard;
use crate::domain::access::{AccessDecision, AccessDenial, Capability};
use crate::domain::foundation::{DomainError, ErrorCode, TokenClaims};

use super::super::dto::ErrorResponse;

/// State for one gated route group.
#[derive(Clone)]
pub struct CapabilityGate {
    guard: Arc<AccessGuard>,
    capability: Capability,
}

impl CapabilityGate {
    pub fn new(guard: Arc<AccessGuard>, capability: Capability) -> Self {
        Self { guard, capability }
    }
}

pub async fn require_capability(
    State(gate): State<CapabilityGate>,
    request: Request,
    next: Next,
) -> Response {
    let claims = request.extensions().get::<TokenClaims>().cloned();

    match gate.guard.authorize(claims.as_ref(), &gate.capability).await {
        Ok(AccessDecision::Allowed) => next.run(request).await,
        Ok(AccessDecision::Denied(denial)) => denial_response(&denial),
        Err(e) => {
            tracing::error!(capability = %gate.capability, error = %e, "Access check failed");
            storage_failure_response(&e)
        }
    }
}

pub fn denial_status(denial: &AccessDenial) -> StatusCode {
    match denial {
        AccessDenial::Unauthenticated | AccessDenial::InvalidToken { .. } => {
            StatusCode::UNAUTHORIZED
        }
        AccessDenial::InsufficientRole { .. } => StatusCode::FORBIDDEN,
        AccessDenial::SubscriptionInactive => StatusCode::PAYMENT_REQUIRED,
    }
}

pub fn denial_response(denial: &AccessDenial) -> Response {
    let body = ErrorResponse::new(denial.code().to_string(), denial.user_message());
    (denial_status(denial), Json(body)).into_response()
}

fn storage_failure_response(err: &DomainError) -> Response {
    let status = match err.code {
        ErrorCode::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = ErrorResponse::new(err.code.to_string(), "Unable to verify access right now");
    (status, Json(body)).into_response()
}
