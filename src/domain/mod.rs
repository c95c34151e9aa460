//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, token claims)
//! - `subscription` - Subscription lifecycle state machine
//! - `access` - Roles, capabilities and access decisions

pub mod access;
pub mod foundation;
pub mod subscription;
