//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionStore` - Durable subscription records
//! - `UserDirectory` - Role lookup
//!
//! ## Service Ports
//!
//! - `NotificationChannel` - Lifecycle notifications to users
//! - `SubscriptionChecker` - Live subscription status for access checks
//! - `Clock` - Current time

mod clock;
mod notification_channel;
mod subscription_checker;
mod subscription_store;
mod user_directory;

pub use clock::Clock;
pub use notification_channel::NotificationChannel;
pub use subscription_checker::SubscriptionChecker;
pub use subscription_store::SubscriptionStore;
pub use user_directory::UserDirectory;
