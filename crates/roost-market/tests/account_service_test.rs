//! Integration tests for registration, verification and credentials.

mod common;

use common::{FakeNotifier, setup_db};
use roost_core::error::RoostError;
use roost_core::models::user::{AccountStatus, CreateUser, UpdateUser};
use roost_core::ports::VerificationMessage;
use roost_core::repository::UserRepository;
use roost_db::SurrealTokenStore;
use roost_db::repository::SurrealUserRepository;
use roost_market::{AccountService, MarketConfig};
use surrealdb::engine::local::Db;
use uuid::Uuid;

type Accounts = AccountService<SurrealUserRepository<Db>, SurrealTokenStore<Db>, FakeNotifier>;

fn accounts(db: &common::TestDb, notifier: FakeNotifier) -> Accounts {
    AccountService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealTokenStore::new(db.clone()),
        notifier,
        MarketConfig::default(),
    )
}

fn signup(email: &str) -> CreateUser {
    CreateUser {
        name: "Gil".into(),
        email: email.into(),
        password: "correct horse battery".into(),
    }
}

/// Pull the raw token out of the last verification link sent.
fn sent_token(notifier: &FakeNotifier) -> String {
    match notifier.last() {
        Some((_, VerificationMessage::EmailVerification { link })) => link
            .split("token=")
            .nth(1)
            .expect("link carries a token")
            .to_string(),
        other => panic!("expected a verification link, got {other:?}"),
    }
}

#[tokio::test]
async fn registration_sends_link_that_verifies_account() {
    let db = setup_db().await;
    let notifier = FakeNotifier::default();
    let accounts = accounts(&db, notifier.clone());

    let user = accounts.register_user(signup("gil@example.com")).await.unwrap();
    assert!(!user.verified);
    assert_eq!(user.status, AccountStatus::Pending);

    let (destination, _) = notifier.last().unwrap();
    assert_eq!(destination, "gil@example.com");
    let token = sent_token(&notifier);

    let err = accounts.verify_email(user.id, "forged").await.unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));

    let verified = accounts.verify_email(user.id, &token).await.unwrap();
    assert!(verified.verified);
    assert_eq!(verified.status, AccountStatus::Active);

    // Tokens are single-use.
    let err = accounts.verify_email(user.id, &token).await.unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));
}

#[tokio::test]
async fn registration_validates_and_rejects_duplicates() {
    let db = setup_db().await;
    let accounts = accounts(&db, FakeNotifier::default());

    let err = accounts
        .register_user(signup("not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::Validation { .. }));

    let mut short = signup("gil@example.com");
    short.password = "short".into();
    let err = accounts.register_user(short).await.unwrap_err();
    assert!(matches!(err, RoostError::Validation { .. }));

    accounts.register_user(signup("gil@example.com")).await.unwrap();
    let err = accounts
        .register_user(signup("gil@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));
}

#[tokio::test]
async fn racing_registrations_leave_one_account() {
    let db = setup_db().await;
    let accounts = accounts(&db, FakeNotifier::default());

    let (a, b) = tokio::join!(
        accounts.register_user(signup("gil@example.com")),
        accounts.register_user(signup("gil@example.com")),
    );

    let (winner, loser) = match (a, b) {
        (Ok(user), Err(e)) | (Err(e), Ok(user)) => (user, e),
        other => panic!("expected exactly one registration to succeed, got {other:?}"),
    };
    assert!(
        matches!(loser, RoostError::BusinessRule { .. }),
        "unexpected error: {loser}"
    );
    let stored = SurrealUserRepository::new(db.clone())
        .get_by_email("gil@example.com")
        .await
        .unwrap();
    assert_eq!(stored.id, winner.id);
}

#[tokio::test]
async fn peppered_hashes_need_the_same_pepper() {
    let db = setup_db().await;
    let config = MarketConfig {
        pepper: Some("harbour".into()),
        ..MarketConfig::default()
    };
    let peppered = AccountService::new(
        SurrealUserRepository::with_pepper(db.clone(), "harbour".into()),
        SurrealTokenStore::new(db.clone()),
        FakeNotifier::default(),
        config,
    );
    peppered.register_user(signup("gil@example.com")).await.unwrap();

    peppered
        .check_credentials("gil@example.com", "correct horse battery")
        .await
        .unwrap();

    let unpeppered = accounts(&db, FakeNotifier::default());
    let err = unpeppered
        .check_credentials("gil@example.com", "correct horse battery")
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn notification_failure_does_not_fail_registration() {
    let db = setup_db().await;
    let accounts = accounts(&db, FakeNotifier::failing());

    let user = accounts.register_user(signup("gil@example.com")).await.unwrap();
    assert_eq!(user.email, "gil@example.com");
    accounts.issue_otp("gil@example.com").await.unwrap();
}

#[tokio::test]
async fn otp_is_consumed_on_success() {
    let db = setup_db().await;
    let notifier = FakeNotifier::default();
    let accounts = accounts(&db, notifier.clone());

    accounts.issue_otp("gil@example.com").await.unwrap();
    let code = match notifier.last() {
        Some((_, VerificationMessage::OneTimePasscode { code, expires_in_secs })) => {
            assert_eq!(expires_in_secs, 300);
            code
        }
        other => panic!("expected a passcode, got {other:?}"),
    };
    assert_eq!(code.len(), 6);

    let wrong = if code == "000000" { "111111" } else { "000000" };
    assert!(!accounts.verify_otp("gil@example.com", wrong).await.unwrap());
    assert!(accounts.verify_otp("gil@example.com", &code).await.unwrap());
    assert!(!accounts.verify_otp("gil@example.com", &code).await.unwrap());
}

#[tokio::test]
async fn credentials_are_checked_against_hash_and_status() {
    let db = setup_db().await;
    let accounts = accounts(&db, FakeNotifier::default());
    let user = accounts.register_user(signup("gil@example.com")).await.unwrap();

    let ok = accounts
        .check_credentials("gil@example.com", "correct horse battery")
        .await
        .unwrap();
    assert_eq!(ok.id, user.id);

    for (email, password) in [
        ("gil@example.com", "wrong horse battery"),
        ("nobody@example.com", "correct horse battery"),
    ] {
        let err = accounts.check_credentials(email, password).await.unwrap_err();
        assert!(matches!(err, RoostError::AuthenticationFailed { .. }));
    }

    SurrealUserRepository::new(db.clone())
        .update(
            user.id,
            UpdateUser {
                status: Some(AccountStatus::Blocked),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = accounts
        .check_credentials("gil@example.com", "correct horse battery")
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn verifying_unknown_user_fails() {
    let db = setup_db().await;
    let accounts = accounts(&db, FakeNotifier::default());

    let err = accounts
        .verify_email(Uuid::new_v4(), "anything")
        .await
        .unwrap_err();
    assert!(matches!(err, RoostError::BusinessRule { .. }));
}
