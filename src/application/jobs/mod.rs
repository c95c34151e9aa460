//! Background jobs and the scheduler that drives them.

mod expiration_sweeper;
mod expiry_notifier;
mod revocation_pruner;
mod scheduler;

pub use expiration_sweeper::ExpirationSweeper;
pub use expiry_notifier::ExpiryNotifier;
pub use revocation_pruner::RevocationPruner;
pub use scheduler::{PeriodicJob, RunGuard, RunOutcome, RunPermit, Scheduler, SchedulerHandle};
