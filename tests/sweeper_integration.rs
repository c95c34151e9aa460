//! Integration tests for the periodic jobs.

use std::sync::Arc;
use std::time::Duration;

use vip_access::adapters::{InMemoryNotificationChannel, InMemorySubscriptionStore, ManualClock};
use vip_access::application::{
    ExpirationSweeper, ExpiryNotifier, PeriodicJob, RevocationPruner, RunOutcome, Scheduler,
    SubscriptionManager, TokenService,
};
use vip_access::config::AuthConfig;
use vip_access::domain::access::Role;
use vip_access::domain::foundation::{Timestamp, UserId};
use vip_access::domain::subscription::{SubscriptionStatus, SubscriptionType};

fn setup() -> (
    Arc<SubscriptionManager>,
    Arc<InMemorySubscriptionStore>,
    Arc<InMemoryNotificationChannel>,
    Arc<ManualClock>,
) {
    let store = Arc::new(InMemorySubscriptionStore::new());
    let notifications = Arc::new(InMemoryNotificationChannel::new());
    let clock = Arc::new(ManualClock::new(
        Timestamp::from_unix_secs(1_700_000_000).unwrap(),
    ));
    let manager = Arc::new(SubscriptionManager::new(
        store.clone(),
        notifications.clone(),
        clock.clone(),
    ));
    (manager, store, notifications, clock)
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

#[tokio::test]
async fn sweep_expires_only_overdue_records() {
    let (manager, _, notifications, clock) = setup();
    manager
        .subscribe(&user("short"), SubscriptionType::Monthly)
        .await
        .unwrap();
    manager
        .subscribe(&user("long"), SubscriptionType::Yearly)
        .await
        .unwrap();

    clock.advance_days(40);
    let sweeper = ExpirationSweeper::new(manager.clone());
    assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Completed(1));

    let short = manager.history(&user("short")).await.unwrap();
    assert_eq!(short[0].status, SubscriptionStatus::Expired);
    assert!(manager.is_active(&user("long")).await.unwrap());
    assert_eq!(
        notifications
            .events_of_type("subscription.expired")
            .await
            .len(),
        1
    );

    // A second pass finds nothing new.
    assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Completed(0));
}

#[tokio::test]
async fn renewed_record_survives_the_sweep() {
    let (manager, _, _, clock) = setup();
    let alice = user("alice");
    manager
        .subscribe(&alice, SubscriptionType::Monthly)
        .await
        .unwrap();

    clock.advance_days(40);
    manager
        .extend(&alice, SubscriptionType::Monthly)
        .await
        .unwrap();

    let sweeper = ExpirationSweeper::new(manager.clone());
    assert_eq!(sweeper.sweep().await.unwrap(), RunOutcome::Completed(0));
    assert!(manager.is_active(&alice).await.unwrap());
}

#[tokio::test]
async fn expiring_soon_notice_is_sent_once_per_end_date() {
    let (manager, _, notifications, clock) = setup();
    let alice = user("alice");
    manager
        .subscribe(&alice, SubscriptionType::Monthly)
        .await
        .unwrap();

    let notifier = ExpiryNotifier::new(
        manager.clone(),
        notifications.clone(),
        clock.clone(),
        chrono::Duration::days(3),
    );

    clock.advance_days(20);
    assert_eq!(notifier.notify_expiring().await.unwrap(), RunOutcome::Completed(0));

    clock.advance_days(8);
    assert_eq!(notifier.notify_expiring().await.unwrap(), RunOutcome::Completed(1));
    assert_eq!(notifier.notify_expiring().await.unwrap(), RunOutcome::Completed(0));

    // Extending moves the end date; a later window announces it again.
    manager
        .extend(&alice, SubscriptionType::Monthly)
        .await
        .unwrap();
    clock.advance_days(31);
    assert_eq!(notifier.notify_expiring().await.unwrap(), RunOutcome::Completed(1));
    assert_eq!(
        notifications
            .events_of_type("subscription.expiring_soon")
            .await
            .len(),
        2
    );
}

#[tokio::test]
async fn pruner_drops_revocations_past_token_expiry() {
    let (_, _, _, clock) = setup();
    let tokens = Arc::new(TokenService::new(
        &AuthConfig::with_secret("integration-test-signing-secret-0123456789"),
        clock.clone(),
    ));
    let issued = tokens.issue("alice", Role::User, None).unwrap();
    tokens.revoke(&issued.token);
    assert_eq!(tokens.revoked_count(), 1);

    let pruner = RevocationPruner::new(tokens.clone());
    assert_eq!(pruner.run().await.unwrap(), RunOutcome::Completed(0));

    clock.advance_days(11);
    assert_eq!(pruner.run().await.unwrap(), RunOutcome::Completed(1));
    assert_eq!(tokens.revoked_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn scheduler_runs_the_sweep_in_the_background() {
    let (manager, store, _, clock) = setup();
    let alice = user("alice");
    manager
        .subscribe(&alice, SubscriptionType::Monthly)
        .await
        .unwrap();
    clock.advance_days(40);

    let handle = Scheduler::new()
        .with_job(
            Arc::new(ExpirationSweeper::new(manager.clone())),
            Duration::from_secs(60),
        )
        .start();
    assert_eq!(handle.job_count(), 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.shutdown().await;

    assert_eq!(store.active_count(&alice).await, 0);
}
