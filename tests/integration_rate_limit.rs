mod common;

use awladna::awladna_auth::Role;
use awladna::awladna_cache::SessionStore;
use awladna::awladna_config::LoginPolicyConfig;
use awladna::awladna_core::{AuthError, AuthOutcome};
use awladna::testing::test_login_policy;
use common::{PASSWORD, TestContext};

/// Create a strict login policy for testing (2 failures per minute)
fn strict_login_policy() -> LoginPolicyConfig {
    LoginPolicyConfig {
        max_attempts: 2,
        attempt_window_secs: 60,
        ..test_login_policy()
    }
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let ctx = TestContext::with_policy(strict_login_policy());
    ctx.seed_user("a@x.com", PASSWORD, Role::Parent).await;
    let manager = ctx.manager();

    for _ in 0..2 {
        assert_eq!(
            manager.login("a@x.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    // Even the right password is refused while locked
    let err = manager.login("a@x.com", PASSWORD).await.unwrap_err();
    assert_eq!(err, AuthError::TooManyAttempts);
    assert_eq!(err.outcome(), AuthOutcome::TooManyRequests);

    ctx.clock.advance_secs(60);
    assert!(manager.login("a@x.com", PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_successful_login_resets_counter() {
    let ctx = TestContext::with_policy(strict_login_policy());
    ctx.seed_user("a@x.com", PASSWORD, Role::Parent).await;
    let manager = ctx.manager();

    manager.login("a@x.com", "wrong").await.unwrap_err();
    manager.login("a@x.com", PASSWORD).await.unwrap();
    assert_eq!(ctx.sessions.login_attempts("a@x.com").await.unwrap(), 0);

    manager.login("a@x.com", "wrong").await.unwrap_err();
    assert!(manager.login("a@x.com", PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_unknown_subjects_are_counted_too() {
    let ctx = TestContext::with_policy(strict_login_policy());
    let manager = ctx.manager();

    manager.login("ghost@x.com", PASSWORD).await.unwrap_err();
    manager.login("ghost@x.com", PASSWORD).await.unwrap_err();

    assert_eq!(
        manager.login("ghost@x.com", PASSWORD).await.unwrap_err(),
        AuthError::TooManyAttempts
    );
}

#[tokio::test]
async fn test_rate_limiter_fails_open() {
    let ctx = TestContext::with_policy(strict_login_policy());
    ctx.seed_user("a@x.com", PASSWORD, Role::Parent).await;
    ctx.sessions.set_available(false);

    // Counting is skipped, so failures never lock the account
    for _ in 0..5 {
        assert_eq!(
            ctx.manager().login("a@x.com", "wrong").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    // Login itself still needs the store for the refresh record
    ctx.sessions.set_available(true);
    assert!(ctx.manager().login("a@x.com", PASSWORD).await.is_ok());
}

#[tokio::test]
async fn test_disabled_rate_limit() {
    let ctx = TestContext::with_policy(LoginPolicyConfig {
        max_attempts: 0,
        ..test_login_policy()
    });
    ctx.seed_user("a@x.com", PASSWORD, Role::Parent).await;

    for _ in 0..10 {
        ctx.manager().login("a@x.com", "wrong").await.unwrap_err();
    }
    assert!(ctx.manager().login("a@x.com", PASSWORD).await.is_ok());
    assert_eq!(ctx.sessions.login_attempts("a@x.com").await.unwrap(), 0);
}

#[tokio::test]
async fn test_subject_spellings_share_one_counter() {
    let ctx = TestContext::with_policy(strict_login_policy());
    ctx.seed_user("a@x.com", PASSWORD, Role::Parent).await;
    let manager = ctx.manager();

    manager.login("A@X.com", "wrong").await.unwrap_err();
    manager.login(" a@x.COM ", "wrong").await.unwrap_err();
    assert_eq!(ctx.sessions.login_attempts("a@x.com").await.unwrap(), 2);

    assert_eq!(
        manager.login("a@x.com", PASSWORD).await.unwrap_err(),
        AuthError::TooManyAttempts
    );
}
