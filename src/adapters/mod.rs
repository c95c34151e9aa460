//! Adapters - Implementations of port interfaces.
//!
//! - `clock` - System and manual clocks
//! - `memory` - In-memory stores for tests and database-less runs
//! - `notifications` - Tracing and recording notification channels
//! - `postgres` - sqlx-backed stores
//! - `http` - axum boundary

pub mod clock;
pub mod http;
pub mod memory;
pub mod notifications;
pub mod postgres;

pub use clock::{ManualClock, SystemClock};
pub use memory::{InMemorySubscriptionStore, InMemoryUserDirectory};
pub use notifications::{InMemoryNotificationChannel, TracingNotificationChannel};
pub use postgres::{PostgresSubscriptionStore, PostgresUserDirectory};
