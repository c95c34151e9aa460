//! Static user roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// A user's static classification.
///
/// Independent of subscription state: holding `Vip` does not by itself
/// grant anything gated on an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Vip,
    Expert,
    Admin,
    Staff,
}

impl Role {
    /// Canonical upper-case name carried in tokens and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Vip => "VIP",
            Role::Expert => "EXPERT",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
        }
    }

    /// All roles, in declaration order.
    pub fn all() -> &'static [Role] {
        &[Role::User, Role::Vip, Role::Expert, Role::Admin, Role::Staff]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: `"vip"` is not `Role::Vip`.
impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ValidationError::invalid_format("role", format!("unknown role '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_names() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>(), Ok(*role));
        }
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("vip".parse::<Role>().is_err());
        assert!("Vip".parse::<Role>().is_err());
        assert!(" VIP".parse::<Role>().is_err());
    }

    #[test]
    fn serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Vip).unwrap(), "\"VIP\"");
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"STAFF\"");
    }
}
