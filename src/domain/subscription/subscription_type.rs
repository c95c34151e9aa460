//! Subscription type definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of paid plan a subscription was bought under.
///
/// The type decides how far an extension moves the end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// One calendar month.
    Monthly,

    /// Three calendar months.
    Quarterly,

    /// Twelve calendar months.
    Yearly,
}

impl SubscriptionType {
    /// Calendar months granted by one purchase of this type.
    pub fn duration_months(&self) -> u32 {
        match self {
            SubscriptionType::Monthly => 1,
            SubscriptionType::Quarterly => 3,
            SubscriptionType::Yearly => 12,
        }
    }

    /// Stable lowercase name used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionType::Monthly => "monthly",
            SubscriptionType::Quarterly => "quarterly",
            SubscriptionType::Yearly => "yearly",
        }
    }

    /// Returns the display name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            SubscriptionType::Monthly => "Monthly",
            SubscriptionType::Quarterly => "Quarterly",
            SubscriptionType::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SubscriptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(SubscriptionType::Monthly),
            "quarterly" => Ok(SubscriptionType::Quarterly),
            "yearly" => Ok(SubscriptionType::Yearly),
            other => Err(format!("unknown subscription type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_are_calendar_months() {
        assert_eq!(SubscriptionType::Monthly.duration_months(), 1);
        assert_eq!(SubscriptionType::Quarterly.duration_months(), 3);
        assert_eq!(SubscriptionType::Yearly.duration_months(), 12);
    }

    #[test]
    fn type_serializes_lowercase() {
        let json = serde_json::to_string(&SubscriptionType::Yearly).unwrap();
        assert_eq!(json, "\"yearly\"");
    }

    #[test]
    fn type_parses_case_insensitively() {
        assert_eq!("MONTHLY".parse::<SubscriptionType>(), Ok(SubscriptionType::Monthly));
        assert_eq!("yearly".parse::<SubscriptionType>(), Ok(SubscriptionType::Yearly));
        assert!("weekly".parse::<SubscriptionType>().is_err());
    }
}
