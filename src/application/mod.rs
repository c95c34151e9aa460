//! Application layer - services that orchestrate the domain through ports.
//!
//! - `tokens` - Session token issue/validate/revoke
//! - `subscription_manager` - Subscription state machine service
//! - `access_guard` - Capability checks
//! - `jobs` - Periodic background work and its scheduler

mod access_guard;
pub mod jobs;
mod subscription_manager;
pub mod tokens;

pub use access_guard::AccessGuard;
pub use jobs::{
    ExpirationSweeper, ExpiryNotifier, PeriodicJob, RevocationPruner, RunOutcome, Scheduler,
    SchedulerHandle,
};
pub use subscription_manager::SubscriptionManager;
pub use tokens::{IssuedToken, TokenService};
