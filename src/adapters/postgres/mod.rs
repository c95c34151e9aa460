//! PostgreSQL adapters.

mod subscription_store;
mod user_directory;

pub use subscription_store::PostgresSubscriptionStore;
pub use user_directory::PostgresUserDirectory;
