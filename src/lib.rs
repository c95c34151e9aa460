//! VIP Access - bearer-token sessions and time-bounded subscription gating
//!
//! Issues and validates signed session tokens, keeps a revocation set,
//! manages one live subscription per user, and gates privileged operations
//! on capabilities (authenticated, role membership, active subscription).
//! Periodic jobs expire overdue subscriptions, announce upcoming expiries
//! and prune stale revocations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
