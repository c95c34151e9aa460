//! Access domain - roles, capabilities and the decisions made about them.

mod capability;
mod decision;
mod role;

pub use capability::Capability;
pub use decision::{AccessDecision, AccessDenial};
pub use role::Role;
