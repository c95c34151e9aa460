//! Axum router for the service.
//!
//! There is no login route. Bearer tokens are minted by the external
//! identity service through `TokenService::issue` with the shared signing
//! secret; this router only validates them and revokes them on
//! `DELETE /api/session`.
//!
//! # Routes
//!
//! ## Public
//! - `GET /health`
//!
//! ## Caller endpoints (Authenticated)
//! - `GET /api/subscription` - live subscription or null
//! - `GET /api/subscription/history` - every record, newest first
//! - `PUT /api/subscription/auto-renewal` - toggle auto-renewal
//! - `DELETE /api/session` - revoke the presented token
//!
//! ## VIP endpoints (ActiveSubscription)
//! - `GET /api/vip/status`
//!
//! ## Admin endpoints (RoleIn ADMIN, STAFF)
//! - `POST /api/admin/users/:user_id/subscription` - open (supersedes current)
//! - `POST /api/admin/users/:user_id/subscription/extend`
//! - `DELETE /api/admin/users/:user_id/subscription` - cancel
//! - `GET /api/admin/subscriptions/expired`
//! - `GET /api/admin/subscriptions/expiring?days=N`

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::domain::access::{Capability, Role};

use super::handlers::{
    admin_cancel, admin_extend, admin_subscribe, get_history, get_subscription, health,
    list_expired, list_expiring, logout, set_auto_renewal, vip_status, AppState,
};
use super::middleware::{auth_middleware, require_capability, CapabilityGate};

fn gated(router: Router<AppState>, state: &AppState, capability: Capability) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        CapabilityGate::new(state.guard.clone(), capability),
        require_capability,
    ))
}

/// Build the complete application router.
pub fn app_router(state: AppState) -> Router {
    let caller = gated(
        Router::new()
            .route("/subscription", get(get_subscription))
            .route("/subscription/history", get(get_history))
            .route("/subscription/auto-renewal", put(set_auto_renewal))
            .route("/session", delete(logout)),
        &state,
        Capability::Authenticated,
    );

    let vip = gated(
        Router::new().route("/vip/status", get(vip_status)),
        &state,
        Capability::ActiveSubscription,
    );

    let admin = gated(
        Router::new()
            .route(
                "/admin/users/:user_id/subscription",
                post(admin_subscribe).delete(admin_cancel),
            )
            .route("/admin/users/:user_id/subscription/extend", post(admin_extend))
            .route("/admin/subscriptions/expired", get(list_expired))
            .route("/admin/subscriptions/expiring", get(list_expiring)),
        &state,
        Capability::role_in([Role::Admin, Role::Staff]),
    );

    Router::new()
        .route("/health", get(health))
        .nest("/api", caller.merge(vip).merge(admin))
        .layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
