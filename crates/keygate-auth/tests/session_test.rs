//! End-to-end session flows against in-memory stores.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use keygate_auth::{AuthError, ErrorCategory, TokenType};
use keygate_core::traits::CacheProvider;
use keygate_database::repositories::NewRefreshToken;
use keygate_database::{TokenLedger, UserDirectory};

use common::{ALICE_EMAIL, ALICE_PASSWORD, ClampedTtlCache, FlakyCache, TestSession};

#[tokio::test]
async fn test_register_then_login() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, Some("Alice".to_string()))
        .await
        .unwrap();
    assert_eq!(user.email, ALICE_EMAIL);
    assert!(user.is_active);
    assert!(!user.is_superuser);
    assert_ne!(user.hashed_password, ALICE_PASSWORD);

    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();
    assert_eq!(pair.token_type, "bearer");
    assert!(pair.access_expires_at < pair.refresh_expires_at);

    let resolved = session.manager.resolve(Some(&pair.access_token)).await.unwrap();
    assert_eq!(resolved.id, user.id);
    assert!(resolved.last_login_at.is_some());

    let records = session.ledger.records_for(user.id);
    assert_eq!(records.len(), 1);
    assert!(!records[0].revoked);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    let err = session
        .manager
        .register(ALICE_EMAIL, "a-different-password", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailTaken));
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_email_is_case_sensitive() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    session
        .manager
        .register("Alice@example.com", ALICE_PASSWORD, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bad_password_and_unknown_email_look_identical() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    let wrong_password = session
        .manager
        .login(ALICE_EMAIL, "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = session
        .manager
        .login("bob@example.com", ALICE_PASSWORD)
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, AuthError::InvalidCredentials));
    assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[tokio::test]
async fn test_inactive_user_cannot_login_or_resolve() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    session.users.update(user.id, |u| u.is_active = false);

    let err = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = session.manager.resolve(Some(&pair.access_token)).await.unwrap_err();
    assert!(matches!(err, AuthError::InactiveUser));
}

#[tokio::test]
async fn test_alice_rotation_scenario() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    let p1 = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();
    let p2 = session.manager.refresh(&p1.refresh_token).await.unwrap();
    assert_ne!(p1.refresh_token, p2.refresh_token);

    let err = session.manager.refresh(&p1.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));

    let p3 = session.manager.refresh(&p2.refresh_token).await.unwrap();
    let err = session.manager.refresh(&p2.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));

    // Every issued access token stays resolvable until its cache entry lapses.
    for pair in [&p1, &p2, &p3] {
        session.manager.resolve(Some(&pair.access_token)).await.unwrap();
    }
}

#[tokio::test]
async fn test_replay_is_rejected_every_time() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();
    session.manager.refresh(&pair.refresh_token).await.unwrap();

    for _ in 0..3 {
        let err = session.manager.refresh(&pair.refresh_token).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRevoked));
    }
}

#[tokio::test]
async fn test_logout_then_refresh_is_revoked() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    session.manager.logout(&pair.refresh_token).await.unwrap();

    let err = session.manager.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));

    // Logout does not touch the access token.
    session.manager.resolve(Some(&pair.access_token)).await.unwrap();
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    session.manager.logout(&pair.refresh_token).await.unwrap();
    session.manager.logout(&pair.refresh_token).await.unwrap();

    let records = session.ledger.records_for(user.id);
    assert_eq!(records.len(), 1);
    assert!(records[0].revoked);
}

#[tokio::test]
async fn test_logout_ignores_access_tokens_and_garbage() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    session.manager.logout(&pair.access_token).await.unwrap();
    session.manager.logout("garbage").await.unwrap();

    assert!(!session.ledger.records_for(user.id)[0].revoked);
    session.manager.refresh(&pair.refresh_token).await.unwrap();
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    let err = session.manager.refresh(&pair.access_token).await.unwrap_err();
    assert!(matches!(err, AuthError::WrongTokenType));
}

#[tokio::test]
async fn test_resolve_rejects_refresh_token() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    let err = session
        .manager
        .resolve(Some(&pair.refresh_token))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WrongTokenType));
}

#[tokio::test]
async fn test_resolve_without_credentials() {
    let session = TestSession::new();
    for bearer in [None, Some(""), Some("   ")] {
        let err = session.manager.resolve(bearer).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    let err = session.manager.resolve(Some("abc.def.ghi")).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Token);
}

#[tokio::test]
async fn test_cache_is_authoritative_for_access_tokens() {
    let cache = Arc::new(ClampedTtlCache::new(Duration::from_millis(300)));
    let session = TestSession::with_cache(cache);
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    session.manager.resolve(Some(&pair.access_token)).await.unwrap();

    tokio::time::sleep(Duration::from_millis(800)).await;

    // The signed expiry is still ~15 minutes away.
    let claims = session.manager.introspect(&pair.access_token).unwrap();
    assert_eq!(claims.token_type, TokenType::Access);
    assert!(claims.expires_at > chrono::Utc::now());

    let err = session.manager.resolve(Some(&pair.access_token)).await.unwrap_err();
    assert!(matches!(err, AuthError::NotCached));
}

#[tokio::test]
async fn test_cache_outage_is_infrastructure() {
    let cache = Arc::new(FlakyCache::new());
    let session = TestSession::with_cache(cache.clone());
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    cache.set_down(true);
    let err = session.manager.resolve(Some(&pair.access_token)).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Infrastructure);

    cache.set_down(false);
    session.manager.resolve(Some(&pair.access_token)).await.unwrap();
}

#[tokio::test]
async fn test_cache_failure_after_ledger_commit_keeps_refresh_usable() {
    let cache = Arc::new(FlakyCache::new());
    let session = TestSession::with_cache(cache.clone());
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    cache.set_down(true);
    let err = session
        .manager
        .login(ALICE_EMAIL, ALICE_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Infrastructure(_)));

    let records = session.ledger.records_for(user.id);
    assert_eq!(records.len(), 1);
    assert!(!records[0].revoked);
    assert!(cache.health_check().await.is_ok_and(|up| !up));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_one_winner() {
    let session = TestSession::new();
    session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = session.manager.clone();
        let token = pair.refresh_token.clone();
        handles.push(tokio::spawn(async move { manager.refresh(&token).await }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(AuthError::TokenRevoked) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_refresh_for_deleted_user() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let pair = session.manager.login(ALICE_EMAIL, ALICE_PASSWORD).await.unwrap();

    // Re-home the ledger record onto a fresh manager with an empty directory.
    let orphaned = TestSession::new();
    let record = session.ledger.records_for(user.id).remove(0);
    keygate_database::TokenLedger::save(
        &orphaned.ledger,
        keygate_database::repositories::NewRefreshToken {
            user_id: record.user_id,
            token_id: record.token_id,
            expires_at: record.expires_at,
        },
    )
    .await
    .unwrap();

    let err = orphaned.manager.refresh(&pair.refresh_token).await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));
}

#[tokio::test]
async fn test_expired_refresh_token_is_rejected() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    // The ledger still considers the token live; only the signature has lapsed.
    let token_id = Uuid::new_v4();
    session
        .ledger
        .save(NewRefreshToken {
            user_id: user.id,
            token_id,
            expires_at: Utc::now() + chrono::Duration::days(7),
        })
        .await
        .unwrap();
    let token = common::sign_refresh_token(
        user.id,
        token_id,
        Utc::now() - chrono::Duration::minutes(5),
    );

    let err = session.manager.refresh(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
    assert_eq!(err.category(), ErrorCategory::Token);
    assert!(!session.ledger.record(token_id).unwrap().revoked);
    assert_eq!(session.ledger.records_for(user.id).len(), 1);
}

#[tokio::test]
async fn test_lapsed_ledger_record_is_not_refreshable() {
    let session = TestSession::new();
    let user = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();

    // Unrevoked but past its own expiry, while the JWT itself is still valid.
    let token_id = Uuid::new_v4();
    session
        .ledger
        .save(NewRefreshToken {
            user_id: user.id,
            token_id,
            expires_at: Utc::now() - chrono::Duration::minutes(1),
        })
        .await
        .unwrap();
    let token = common::sign_refresh_token(
        user.id,
        token_id,
        Utc::now() + chrono::Duration::hours(1),
    );

    let err = session.manager.refresh(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::TokenRevoked));

    let records = session.ledger.records_for(user.id);
    assert_eq!(records.len(), 1);
    assert!(!records[0].revoked);
    assert!(!session.ledger.is_active(token_id).await.unwrap());
}

#[tokio::test]
async fn test_list_users_requires_superuser() {
    let session = TestSession::new();
    let alice = session
        .manager
        .register(ALICE_EMAIL, ALICE_PASSWORD, None)
        .await
        .unwrap();
    let bob = session
        .manager
        .register("bob@example.com", "hunter22", None)
        .await
        .unwrap();

    let err = session.manager.list_users(&alice).await.unwrap_err();
    assert!(matches!(err, AuthError::Forbidden));

    session.users.update(bob.id, |u| u.is_superuser = true);
    let bob = session.users.get_by_id(bob.id).await.unwrap().unwrap();
    let users = session.manager.list_users(&bob).await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, bob.id);
}
