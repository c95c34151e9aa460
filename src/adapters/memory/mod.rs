//! In-memory adapters for development and tests.

mod subscription_store;
mod user_directory;

pub use subscription_store::InMemorySubscriptionStore;
pub use user_directory::InMemoryUserDirectory;
