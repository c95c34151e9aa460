//! HTTP handlers for session and subscription endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::{AccessGuard, SubscriptionManager, TokenService};
use crate::config::MAX_EXPIRING_WINDOW_DAYS;
use crate::domain::foundation::{DomainError, TokenClaims, UserId};
use crate::domain::subscription::{Subscription, SubscriptionError};
use crate::ports::Clock;

use super::dto::{
    AutoRenewalRequest, ErrorResponse, ExpiringQuery, ExtendRequest, SubscribeRequest,
    SubscriptionListResponse, SubscriptionResponse, SubscriptionView, VipStatusResponse,
};
use super::middleware::{BearerToken, RequireAuth};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared dependencies for every handler.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub guard: Arc<AccessGuard>,
    pub subscriptions: Arc<SubscriptionManager>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    fn view_list(&self, subs: &[Subscription]) -> SubscriptionListResponse {
        let now = self.clock.now();
        SubscriptionListResponse {
            subscriptions: subs.iter().map(|s| SubscriptionView::at(s, now)).collect(),
        }
    }
}

fn caller_user_id(claims: &TokenClaims) -> Result<UserId, ApiError> {
    claims
        .user_id()
        .cloned()
        .ok_or_else(|| SubscriptionError::validation("uid", "Token is not bound to a user").into())
}

fn path_user_id(raw: String) -> Result<UserId, ApiError> {
    UserId::new(raw).map_err(|e| ApiError(SubscriptionError::validation("user_id", e.to_string())))
}

// ════════════════════════════════════════════════════════════════════════════════
// Public
// ════════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Caller Endpoints (Authenticated)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/subscription - the caller's live subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user_id) = claims.user_id() else {
        return Ok(Json(SubscriptionResponse { subscription: None }));
    };

    let current = state.subscriptions.current(user_id).await?;
    let now = state.clock.now();
    Ok(Json(SubscriptionResponse {
        subscription: current.as_ref().map(|s| SubscriptionView::at(s, now)),
    }))
}

/// GET /api/subscription/history
pub async fn get_history(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = caller_user_id(&claims)?;
    let history = state.subscriptions.history(&user_id).await?;
    Ok(Json(state.view_list(&history)))
}

/// PUT /api/subscription/auto-renewal
pub async fn set_auto_renewal(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    Json(request): Json<AutoRenewalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = caller_user_id(&claims)?;
    let updated = state
        .subscriptions
        .set_auto_renewal(&user_id, request.enabled)
        .await?;
    Ok(Json(SubscriptionResponse {
        subscription: Some(SubscriptionView::at(&updated, state.clock.now())),
    }))
}

/// DELETE /api/session - revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
    token: Option<axum::Extension<BearerToken>>,
) -> StatusCode {
    if let Some(axum::Extension(BearerToken(token))) = token {
        state.tokens.revoke(&token);
        tracing::info!(subject = %claims.sub, "Signed out");
    }
    StatusCode::NO_CONTENT
}

// ════════════════════════════════════════════════════════════════════════════════
// VIP Endpoints (ActiveSubscription)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/vip/status
pub async fn vip_status(
    State(state): State<AppState>,
    RequireAuth(claims): RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = caller_user_id(&claims)?;
    let current = state.subscriptions.current(&user_id).await?;
    Ok(Json(VipStatusResponse {
        vip: current.is_some(),
        end_date: current.map(|s| s.end_date),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Admin Endpoints (RoleIn ADMIN, STAFF)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/admin/users/:user_id/subscription
pub async fn admin_subscribe(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = path_user_id(user_id)?;
    let created = match request.duration_months {
        Some(months) => {
            state
                .subscriptions
                .create(&user_id, request.subscription_type, months)
                .await?
        }
        None => {
            state
                .subscriptions
                .subscribe(&user_id, request.subscription_type)
                .await?
        }
    };

    let response = SubscriptionResponse {
        subscription: Some(SubscriptionView::at(&created, state.clock.now())),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/admin/users/:user_id/subscription/extend
pub async fn admin_extend(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<ExtendRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = path_user_id(user_id)?;
    let extended = state
        .subscriptions
        .extend(&user_id, request.subscription_type)
        .await?;
    Ok(Json(SubscriptionResponse {
        subscription: Some(SubscriptionView::at(&extended, state.clock.now())),
    }))
}

/// DELETE /api/admin/users/:user_id/subscription
pub async fn admin_cancel(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = path_user_id(user_id)?;
    let cancelled = state.subscriptions.cancel(&user_id).await?;
    let now = state.clock.now();
    Ok(Json(SubscriptionResponse {
        subscription: cancelled.as_ref().map(|s| SubscriptionView::at(s, now)),
    }))
}

/// GET /api/admin/subscriptions/expired - overdue records awaiting the sweep
pub async fn list_expired(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let expired = state.subscriptions.get_expired().await?;
    Ok(Json(state.view_list(&expired)))
}

/// GET /api/admin/subscriptions/expiring?days=N
pub async fn list_expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !(1..=MAX_EXPIRING_WINDOW_DAYS).contains(&query.days) {
        return Err(SubscriptionError::validation(
            "days",
            format!("Must be between 1 and {}", MAX_EXPIRING_WINDOW_DAYS),
        )
        .into());
    }
    let window = chrono::Duration::try_days(query.days)
        .ok_or_else(|| SubscriptionError::validation("days", "Out of range"))?;
    let expiring = state.subscriptions.get_expiring_within(window).await?;
    Ok(Json(state.view_list(&expiring)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts subscription errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(SubscriptionError);

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SubscriptionError::NotFound(_) => StatusCode::NOT_FOUND,
            SubscriptionError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            SubscriptionError::InvalidState { .. } => StatusCode::CONFLICT,
            SubscriptionError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            SubscriptionError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Subscription request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_404() {
        let err = ApiError(SubscriptionError::not_found(UserId::new("7").unwrap()));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_is_500() {
        let err: ApiError = DomainError::database("down").into();
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_is_400() {
        let err = path_user_id("  ".to_string()).unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
