//! Subscription aggregate entity.
//!
//! A Subscription is one user's paid access window. A user can accumulate
//! many records over time (history is kept for audit), but at most one of
//! them is Active at any instant. That cross-record rule is enforced by the
//! subscription manager; this type guards the per-record rules.
//!
//! Every operation takes `now` explicitly so that callers decide which
//! clock the lifecycle runs on.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, StateMachine, SubscriptionId, Timestamp, UserId,
};

use super::{SubscriptionStatus, SubscriptionType};

/// Longest term a single purchase may open, in months.
pub const MAX_DURATION_MONTHS: u32 = 120;

/// Subscription aggregate.
///
/// # Invariants
///
/// - `start_date <= end_date`
/// - Status transitions follow [`SubscriptionStatus`] rules
/// - Expired and Cancelled records are never modified again
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this record.
    pub id: SubscriptionId,

    /// User who owns this subscription.
    pub user_id: UserId,

    /// Plan the subscription was bought under.
    pub subscription_type: SubscriptionType,

    /// Start of the paid window.
    pub start_date: Timestamp,

    /// End of the paid window (inclusive).
    pub end_date: Timestamp,

    /// Current lifecycle status.
    pub status: SubscriptionStatus,

    /// Whether the user opted into automatic renewal.
    pub auto_renewal_enabled: bool,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    /// When the record was cancelled (if cancelled).
    pub cancelled_at: Option<Timestamp>,

    /// When the sweep recorded the expiry (if expired).
    pub expired_at: Option<Timestamp>,
}

impl Subscription {
    /// Open a new Active subscription running `duration_months` calendar
    /// months from `now`.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `duration_months` is zero or larger
    /// than [`MAX_DURATION_MONTHS`].
    pub fn start(
        id: SubscriptionId,
        user_id: UserId,
        subscription_type: SubscriptionType,
        duration_months: u32,
        now: Timestamp,
    ) -> Result<Self, DomainError> {
        if duration_months == 0 || duration_months > MAX_DURATION_MONTHS {
            return Err(DomainError::validation(
                "duration_months",
                format!(
                    "Duration must be between 1 and {} months, got {}",
                    MAX_DURATION_MONTHS, duration_months
                ),
            ));
        }

        Ok(Self {
            id,
            user_id,
            subscription_type,
            start_date: now,
            end_date: now.add_months(duration_months),
            status: SubscriptionStatus::Active,
            auto_renewal_enabled: false,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
            expired_at: None,
        })
    }

    /// True when the record is Active and its window still covers `now`.
    ///
    /// This is the live check used for gating; it does not rely on the
    /// sweep having run.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && now <= self.end_date
    }

    /// True when the record is still marked Active but its window closed.
    pub fn is_overdue_at(&self, now: Timestamp) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date < now
    }

    /// Push the end date forward by `months` calendar months.
    ///
    /// Time is added from the later of `now` and the current end date:
    /// remaining time is kept, overdue time is never counted twice.
    /// Returns the previous end date.
    ///
    /// # Errors
    ///
    /// Returns error if the record is not Active.
    pub fn extend(&mut self, months: u32, now: Timestamp) -> Result<Timestamp, DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;

        let previous_end = self.end_date;
        self.end_date = previous_end.latest(now).add_months(months);
        self.updated_at = now;
        Ok(previous_end)
    }

    /// Cancel immediately. No grace period.
    ///
    /// # Errors
    ///
    /// Returns error if the record is already terminal.
    pub fn cancel(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.cancelled_at = Some(now);
        self.auto_renewal_enabled = false;
        self.updated_at = now;
        Ok(())
    }

    /// Record that the window has closed.
    ///
    /// # Errors
    ///
    /// Returns error if the record is already terminal.
    pub fn expire(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.expired_at = Some(now);
        self.auto_renewal_enabled = false;
        self.updated_at = now;
        Ok(())
    }

    /// Toggle automatic renewal on an Active record.
    ///
    /// # Errors
    ///
    /// Returns error if the record is not Active.
    pub fn set_auto_renewal(&mut self, enabled: bool, now: Timestamp) -> Result<(), DomainError> {
        if self.status != SubscriptionStatus::Active {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot change auto-renewal on a {} subscription", self.status),
            ));
        }
        self.auto_renewal_enabled = enabled;
        self.updated_at = now;
        Ok(())
    }

    /// Whole days left in the window. Returns 0 once the window has closed.
    pub fn days_remaining(&self, now: Timestamp) -> u32 {
        if now >= self.end_date {
            return 0;
        }
        self.end_date.duration_since(&now).num_days().max(0) as u32
    }

    /// True when the record is live and its window closes within `window`.
    pub fn ends_within(&self, now: Timestamp, window: Duration) -> bool {
        self.is_active_at(now) && self.end_date <= now.plus(window)
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
            .with_detail("subscription_id", self.id.to_string())
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn t0() -> Timestamp {
        Timestamp::from_datetime(
            DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    fn monthly() -> Subscription {
        Subscription::start(
            SubscriptionId::new(),
            UserId::new("7").unwrap(),
            SubscriptionType::Monthly,
            1,
            t0(),
        )
        .unwrap()
    }

    #[test]
    fn start_opens_active_window() {
        let sub = monthly();

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.start_date, t0());
        assert_eq!(sub.end_date, t0().add_months(1));
        assert!(sub.start_date <= sub.end_date);
        assert!(!sub.auto_renewal_enabled);
    }

    #[test]
    fn start_rejects_zero_months() {
        let result = Subscription::start(
            SubscriptionId::new(),
            UserId::new("7").unwrap(),
            SubscriptionType::Monthly,
            0,
            t0(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn start_rejects_absurd_duration() {
        let result = Subscription::start(
            SubscriptionId::new(),
            UserId::new("7").unwrap(),
            SubscriptionType::Yearly,
            MAX_DURATION_MONTHS + 1,
            t0(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn active_until_end_date_inclusive() {
        let sub = monthly();

        assert!(sub.is_active_at(t0().add_days(1)));
        assert!(sub.is_active_at(sub.end_date));
        assert!(!sub.is_active_at(t0().add_days(31)));
        assert!(sub.is_overdue_at(t0().add_days(31)));
    }

    #[test]
    fn extend_before_expiry_adds_on_top_of_remaining_time() {
        let mut sub = monthly();
        let old_end = sub.end_date;
        let now = old_end.minus_days(5);

        let previous = sub.extend(1, now).unwrap();

        assert_eq!(previous, old_end);
        assert_eq!(sub.end_date, old_end.add_months(1));
    }

    #[test]
    fn extend_after_missed_sweep_counts_from_now() {
        let mut sub = monthly();
        let now = sub.end_date.add_days(10);

        sub.extend(1, now).unwrap();

        assert_eq!(sub.end_date, now.add_months(1));
        assert!(sub.is_active_at(now));
    }

    #[test]
    fn cancel_is_immediate() {
        let mut sub = monthly();
        let now = t0().add_days(3);

        sub.cancel(now).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Cancelled);
        assert_eq!(sub.cancelled_at, Some(now));
        assert!(!sub.is_active_at(now));
    }

    #[test]
    fn terminal_records_cannot_be_extended() {
        let mut cancelled = monthly();
        cancelled.cancel(t0()).unwrap();
        assert!(cancelled.extend(1, t0()).is_err());

        let mut expired = monthly();
        expired.expire(t0().add_days(40)).unwrap();
        assert!(expired.extend(1, t0()).is_err());
        assert!(expired.cancel(t0()).is_err());
    }

    #[test]
    fn expire_records_when() {
        let mut sub = monthly();
        let now = t0().add_days(40);

        sub.expire(now).unwrap();

        assert_eq!(sub.status, SubscriptionStatus::Expired);
        assert_eq!(sub.expired_at, Some(now));
    }

    #[test]
    fn auto_renewal_only_on_active() {
        let mut sub = monthly();
        sub.set_auto_renewal(true, t0()).unwrap();
        assert!(sub.auto_renewal_enabled);

        sub.cancel(t0()).unwrap();
        assert!(!sub.auto_renewal_enabled);
        assert!(sub.set_auto_renewal(true, t0()).is_err());
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        let sub = monthly();
        assert_eq!(sub.days_remaining(sub.end_date.minus_days(5)), 5);
        assert_eq!(sub.days_remaining(sub.end_date.add_days(1)), 0);
    }

    #[test]
    fn ends_within_window() {
        let sub = monthly();
        let now = sub.end_date.minus_days(2);

        assert!(sub.ends_within(now, Duration::days(3)));
        assert!(!sub.ends_within(now, Duration::days(1)));
        assert!(!sub.ends_within(sub.end_date.add_days(1), Duration::days(3)));
    }
}
