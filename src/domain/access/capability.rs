//! Capabilities: named permission gates checked before privileged work.

use std::fmt;

use super::Role;

/// A permission gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Any caller holding a valid token.
    Authenticated,

    /// Caller's role must be one of the listed roles.
    RoleIn(Vec<Role>),

    /// Caller must hold a subscription that is active right now.
    ActiveSubscription,
}

impl Capability {
    /// Gate for a set of roles.
    pub fn role_in(roles: impl IntoIterator<Item = Role>) -> Self {
        Capability::RoleIn(roles.into_iter().collect())
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Authenticated => "authenticated",
            Capability::RoleIn(_) => "role_in",
            Capability::ActiveSubscription => "active_subscription",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::RoleIn(roles) => {
                let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
                write!(f, "role_in[{}]", names.join(","))
            }
            other => f.write_str(other.name()),
        }
    }
}
