use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tessera::application_impl::{RealRotationService, RotationConfig};
use tessera::application_port::{RotationError, RotationService};
use tessera::domain_model::OwnerId;
use tessera::domain_port::{SessionStore, SessionStoreError};
use tessera::infra_memory::{
    InMemoryCredentialStore, InMemoryRevocationRegistry, InMemorySessionStore, ManualClock,
    OsRngSecretSource, SessionConfig,
};

fn rotation_service(config: RotationConfig) -> (Arc<RealRotationService>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = RealRotationService::new(
        Arc::new(InMemoryCredentialStore::new()),
        Arc::new(InMemoryRevocationRegistry::new()),
        Arc::new(OsRngSecretSource),
        clock.clone(),
        config,
    );
    (Arc::new(service), clock)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exchange_has_a_single_winner() {
    let (service, _) = rotation_service(RotationConfig::default());
    let pair = service.issue_pair(OwnerId::from("u1")).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        let token = pair.refresh_token.clone();
        tasks.push(tokio::spawn(
            async move { service.exchange(&token).await },
        ));
    }

    let mut successes = 0;
    let mut reuse_detections = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(RotationError::ReuseDetected) => reuse_detections += 1,
            Err(other) => panic!("unexpected outcome: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(reuse_detections, 15);
}

#[tokio::test]
async fn expired_refresh_token_requires_reauthentication() {
    let (service, clock) = rotation_service(RotationConfig {
        access_ttl: Duration::from_secs(60),
        refresh_ttl: Duration::from_secs(1),
    });
    let pair = service.issue_pair(OwnerId::from("u1")).await.unwrap();

    clock.advance(Duration::from_secs(2));

    let err = service.exchange(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, RotationError::TokenExpired));
    assert_eq!(err.public_message(), "invalid or expired credential");
}

#[tokio::test]
async fn replay_after_rotation_kills_the_whole_lineage() {
    let (service, _) = rotation_service(RotationConfig::default());
    let pair1 = service.issue_pair(OwnerId::from("u1")).await.unwrap();

    let pair2 = service.exchange(&pair1.refresh_token).await.unwrap();

    let err = service.exchange(&pair1.refresh_token).await.unwrap_err();
    assert!(matches!(err, RotationError::ReuseDetected));

    // Every rejection looks identical to the presenter.
    let successor_err = service.exchange(&pair2.refresh_token).await.unwrap_err();
    assert_eq!(
        successor_err.public_message(),
        "invalid or expired credential"
    );
    assert_eq!(err.public_message(), successor_err.public_message());
}

#[tokio::test]
async fn idle_session_expires_once_then_is_unknown() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = InMemorySessionStore::new(
        Arc::new(OsRngSecretSource),
        clock.clone(),
        SessionConfig {
            idle_timeout: Duration::from_secs(60),
            max_lifetime: None,
        },
    );

    let session = store.create(OwnerId::from("u1")).await.unwrap();

    clock.advance(Duration::from_secs(61));
    let err = store.touch(&session.id).await.unwrap_err();
    assert!(matches!(err, SessionStoreError::Expired));

    let err = store.touch(&session.id).await.unwrap_err();
    assert!(matches!(err, SessionStoreError::NotFound));
}
