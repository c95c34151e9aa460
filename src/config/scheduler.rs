//! Background job configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Largest expiring-soon window accepted, in days.
pub const MAX_EXPIRING_WINDOW_DAYS: i64 = 365;

/// Periods for the background jobs.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// How often overdue subscriptions are expired.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// How often expiring-soon notices go out.
    #[serde(default = "default_notify_interval")]
    pub notify_interval_secs: u64,

    /// Window for expiring-soon notices.
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: i64,

    /// How often expired revocation entries are dropped.
    #[serde(default = "default_prune_interval")]
    pub revocation_prune_interval_secs: u64,
}

impl SchedulerConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn notify_interval(&self) -> Duration {
        Duration::from_secs(self.notify_interval_secs)
    }

    pub fn expiring_soon_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.expiring_soon_days).unwrap_or(chrono::Duration::MAX)
    }

    pub fn revocation_prune_interval(&self) -> Duration {
        Duration::from_secs(self.revocation_prune_interval_secs)
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("sweep_interval_secs"));
        }
        if self.notify_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval("notify_interval_secs"));
        }
        if !(1..=MAX_EXPIRING_WINDOW_DAYS).contains(&self.expiring_soon_days) {
            return Err(ValidationError::InvalidInterval("expiring_soon_days"));
        }
        if self.revocation_prune_interval_secs == 0 {
            return Err(ValidationError::InvalidInterval(
                "revocation_prune_interval_secs",
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            notify_interval_secs: default_notify_interval(),
            expiring_soon_days: default_expiring_soon_days(),
            revocation_prune_interval_secs: default_prune_interval(),
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_notify_interval() -> u64 {
    3600
}

fn default_expiring_soon_days() -> i64 {
    3
}

fn default_prune_interval() -> u64 {
    3600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.notify_interval(), Duration::from_secs(3600));
        assert_eq!(config.expiring_soon_window(), chrono::Duration::days(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = SchedulerConfig {
            sweep_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidInterval("sweep_interval_secs"))
        );
    }

    #[test]
    fn test_oversized_expiring_window_rejected() {
        let config = SchedulerConfig {
            expiring_soon_days: 100_000_000,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidInterval("expiring_soon_days"))
        );
        // Still computable without overflow when unvalidated.
        let _ = config.expiring_soon_window();
    }
}
