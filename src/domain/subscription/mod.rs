//! Subscription domain module.
//!
//! Time-bounded paid access ("VIP") for a user.
//!
//! # Module Structure
//!
//! - `aggregate` - Subscription aggregate entity
//! - `status` - SubscriptionStatus state machine
//! - `subscription_type` - Plan kinds and their durations
//! - `events` - Lifecycle events for notification
//! - `errors` - SubscriptionError

mod aggregate;
mod errors;
mod events;
mod status;
mod subscription_type;

pub use aggregate::{Subscription, MAX_DURATION_MONTHS};
pub use errors::SubscriptionError;
pub use events::{CancelReason, SubscriptionEvent};
pub use status::SubscriptionStatus;
pub use subscription_type::SubscriptionType;
