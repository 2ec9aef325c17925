mod common;

use awladna::awladna_auth::{Role, TokenPurpose};
use awladna::awladna_core::{AuthError, AuthOutcome};
use awladna::awladna_models::CredentialStore;
use common::{PASSWORD, TestContext, generate_unique_email};

#[tokio::test]
async fn test_register_verify_login() {
    let ctx = TestContext::new();
    let manager = ctx.manager();
    let subject = generate_unique_email("register");

    let registration = manager.register(&subject, PASSWORD).await.unwrap();
    assert_eq!(registration.subject, subject);

    let stored = ctx
        .credentials
        .find_by_subject(&subject)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.role, Role::Parent);
    assert!(!stored.is_verified);
    assert_eq!(
        stored.verification_token.as_deref(),
        Some(registration.verification_token.as_str())
    );

    // Unverified accounts cannot log in
    assert_eq!(
        manager.login(&subject, PASSWORD).await.unwrap_err(),
        AuthError::InvalidCredentials
    );

    let verified = manager
        .verify_email(&registration.verification_token)
        .await
        .unwrap();
    assert!(verified.is_verified);
    assert_eq!(verified.verification_token, None);

    // Replaying the link is harmless
    assert!(
        manager
            .verify_email(&registration.verification_token)
            .await
            .unwrap()
            .is_verified
    );

    let pair = manager.login(&subject, PASSWORD).await.unwrap();
    assert_eq!(
        manager.codec().decode_access(&pair.access_token).unwrap().sub,
        subject
    );
}

#[tokio::test]
async fn test_register_duplicate() {
    let ctx = TestContext::new();
    let subject = generate_unique_email("dup");

    ctx.manager().register(&subject, PASSWORD).await.unwrap();
    let err = ctx.manager().register(&subject, "other").await.unwrap_err();

    assert_eq!(err, AuthError::SubjectAlreadyExists);
    assert_eq!(err.outcome(), AuthOutcome::Conflict);
}

#[tokio::test]
async fn test_verify_email_rejects_reset_token_and_stale_links() {
    let ctx = TestContext::new();
    let manager = ctx.manager();
    let subject = generate_unique_email("verify");
    let registration = manager.register(&subject, PASSWORD).await.unwrap();

    let reset = manager
        .issue_scoped_token(&subject, TokenPurpose::PasswordReset)
        .unwrap();
    assert_eq!(
        manager.verify_email(&reset).await.unwrap_err(),
        AuthError::TokenInvalid
    );

    let max_age = manager.scoped().max_age(TokenPurpose::EmailVerification);
    ctx.clock.advance_secs(max_age.as_secs() as i64 + 1);
    assert_eq!(
        manager
            .verify_email(&registration.verification_token)
            .await
            .unwrap_err(),
        AuthError::TokenInvalid
    );
}

#[tokio::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new();
    ctx.seed_user("reset@x.com", PASSWORD, Role::Parent).await;
    let manager = ctx.manager();

    let token = manager
        .request_password_reset("reset@x.com")
        .await
        .unwrap()
        .expect("known subject gets a token");

    manager.reset_password(&token, "new-password").await.unwrap();

    assert_eq!(
        manager.login("reset@x.com", PASSWORD).await.unwrap_err(),
        AuthError::InvalidCredentials
    );
    assert!(manager.login("reset@x.com", "new-password").await.is_ok());
}

#[tokio::test]
async fn test_password_reset_unknown_subject() {
    let ctx = TestContext::new();

    let token = ctx
        .manager()
        .request_password_reset("ghost@x.com")
        .await
        .unwrap();
    assert!(token.is_none());
}

#[tokio::test]
async fn test_password_reset_rejects_other_purposes() {
    let ctx = TestContext::new();
    ctx.seed_user("reset@x.com", PASSWORD, Role::Parent).await;
    let manager = ctx.manager();

    let verification = manager
        .issue_scoped_token("reset@x.com", TokenPurpose::EmailVerification)
        .unwrap();
    assert_eq!(
        manager
            .reset_password(&verification, "new-password")
            .await
            .unwrap_err(),
        AuthError::TokenInvalid
    );
    assert_eq!(
        manager
            .reset_password("garbage", "new-password")
            .await
            .unwrap_err(),
        AuthError::TokenInvalid
    );
}

#[tokio::test]
async fn test_register_rejects_malformed_subjects() {
    let ctx = TestContext::new();
    let manager = ctx.manager();

    for subject in ["", "   ", "not-an-email", "a@", "@x.com"] {
        let err = manager.register(subject, PASSWORD).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidInput(_)), "{subject:?}");
        assert_eq!(err.outcome(), AuthOutcome::BadRequest);
    }
    assert!(ctx.credentials.is_empty().await);
}

#[tokio::test]
async fn test_register_rejects_overlong_password() {
    let ctx = TestContext::new();
    let subject = generate_unique_email("long");

    let err = ctx
        .manager()
        .register(&subject, &"p".repeat(73))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput(_)));
    assert!(ctx.credentials.is_empty().await);
}

#[tokio::test]
async fn test_subjects_are_normalized() {
    let ctx = TestContext::new();
    let manager = ctx.manager();

    let registration = manager.register("  Mixed.Case@X.com ", PASSWORD).await.unwrap();
    assert_eq!(registration.subject, "mixed.case@x.com");
    assert!(
        ctx.credentials
            .find_by_subject("mixed.case@x.com")
            .await
            .unwrap()
            .is_some()
    );

    // Differently cased spellings are the same account
    assert_eq!(
        manager
            .register("MIXED.CASE@x.com", PASSWORD)
            .await
            .unwrap_err(),
        AuthError::SubjectAlreadyExists
    );

    manager
        .verify_email(&registration.verification_token)
        .await
        .unwrap();
    let pair = manager.login("Mixed.Case@X.COM", PASSWORD).await.unwrap();
    assert_eq!(
        manager.codec().decode_access(&pair.access_token).unwrap().sub,
        "mixed.case@x.com"
    );

    assert!(
        manager
            .request_password_reset(" MIXED.case@x.com")
            .await
            .unwrap()
            .is_some()
    );
}
