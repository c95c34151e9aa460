//! Clock port.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
///
/// Everything time-dependent (token expiry, subscription windows, sweeps)
/// reads the time through this trait.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
