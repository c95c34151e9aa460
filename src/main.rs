//! vip-access server binary.

use std::error::Error;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vip_access::adapters::http::{app_router, AppState};
use vip_access::adapters::{
    InMemorySubscriptionStore, InMemoryUserDirectory, PostgresSubscriptionStore,
    PostgresUserDirectory, SystemClock, TracingNotificationChannel,
};
use vip_access::application::{
    AccessGuard, ExpirationSweeper, ExpiryNotifier, RevocationPruner, Scheduler,
    SubscriptionManager, TokenService,
};
use vip_access::config::{AppConfig, DatabaseConfig};
use vip_access::ports::{
    Clock, NotificationChannel, SubscriptionChecker, SubscriptionStore, UserDirectory,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let addr = config.server.socket_addr()?;
    tracing::info!(
        environment = ?config.server.environment,
        %addr,
        "Starting vip-access"
    );

    let (store, directory) = match &config.database {
        Some(database) => connect_postgres(database).await?,
        None => {
            tracing::warn!("No database configured; using in-memory storage");
            let store: Arc<dyn SubscriptionStore> = Arc::new(InMemorySubscriptionStore::new());
            let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryUserDirectory::new());
            (store, directory)
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier: Arc<dyn NotificationChannel> = Arc::new(TracingNotificationChannel);

    let tokens = Arc::new(TokenService::new(&config.auth, clock.clone()));
    let subscriptions = Arc::new(SubscriptionManager::new(
        store,
        notifier.clone(),
        clock.clone(),
    ));
    let checker: Arc<dyn SubscriptionChecker> = subscriptions.clone();
    let guard = Arc::new(AccessGuard::new(tokens.clone(), checker, directory));

    let scheduler = Scheduler::new()
        .with_job(
            Arc::new(ExpirationSweeper::new(subscriptions.clone())),
            config.scheduler.sweep_interval(),
        )
        .with_job(
            Arc::new(ExpiryNotifier::new(
                subscriptions.clone(),
                notifier,
                clock.clone(),
                config.scheduler.expiring_soon_window(),
            )),
            config.scheduler.notify_interval(),
        )
        .with_job(
            Arc::new(RevocationPruner::new(tokens.clone())),
            config.scheduler.revocation_prune_interval(),
        )
        .start();

    let state = AppState {
        tokens,
        guard,
        subscriptions,
        clock,
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_postgres(
    database: &DatabaseConfig,
) -> Result<(Arc<dyn SubscriptionStore>, Arc<dyn UserDirectory>), Box<dyn Error>> {
    let pool = PgPoolOptions::new()
        .min_connections(database.min_connections)
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(&database.url)
        .await?;

    if database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let store: Arc<dyn SubscriptionStore> = Arc::new(PostgresSubscriptionStore::new(pool.clone()));
    let directory: Arc<dyn UserDirectory> = Arc::new(PostgresUserDirectory::new(pool));
    Ok((store, directory))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
