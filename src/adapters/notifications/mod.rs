//! Notification channel adapters.

mod in_memory;
mod logging;

pub use in_memory::InMemoryNotificationChannel;
pub use logging::TracingNotificationChannel;
