use std::sync::Arc;
use std::time::Duration;

use awladna::awladna_auth::{TokenCodec, TokenKind};
use awladna::awladna_config::JwtConfig;
use awladna::awladna_core::{AuthError, ManualClock};

const EPOCH: i64 = 1_700_000_000;

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        access_token_expiry: 3600,
        refresh_token_expiry: 604800,
        leeway: 0,
    }
}

fn codec() -> (TokenCodec, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::at_secs(EPOCH));
    (TokenCodec::new(get_test_jwt_config(), clock.clone()), clock)
}

#[test]
fn test_issue_access_token_success() {
    let (codec, _) = codec();

    let token = codec.issue_access_default("test@example.com").unwrap();
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3);
}

#[test]
fn test_decode_returns_subject() {
    let (codec, _) = codec();
    let email = "test@example.com";

    let token = codec.issue_access(email, Duration::from_secs(60)).unwrap();
    let claims = codec.decode(&token).unwrap();

    assert_eq!(claims.sub, email);
    assert_eq!(claims.typ, TokenKind::Access);
    assert_eq!(claims.iat, EPOCH);
    assert_eq!(claims.exp, EPOCH + 60);
}

#[test]
fn test_expiry_boundary() {
    let (codec, clock) = codec();
    let ttl = 600;

    let token = codec
        .issue_access("a@x.com", Duration::from_secs(ttl))
        .unwrap();

    clock.advance_secs(ttl as i64 - 1);
    assert!(codec.decode(&token).is_ok());

    clock.advance_secs(2);
    assert_eq!(codec.decode(&token).unwrap_err(), AuthError::TokenExpired);
}

#[test]
fn test_verify_token_wrong_secret() {
    let (codec, clock) = codec();
    let token = codec.issue_access_default("a@x.com").unwrap();

    let mut other_config = get_test_jwt_config();
    other_config.secret = "wrong_secret".to_string();
    let other = TokenCodec::new(other_config, clock);

    assert_eq!(other.decode(&token).unwrap_err(), AuthError::TokenInvalid);
}

#[test]
fn test_verify_token_malformed() {
    let (codec, _) = codec();

    for token in ["", "invalid", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.sig"] {
        assert_eq!(codec.decode(token).unwrap_err(), AuthError::TokenInvalid);
    }
}

#[test]
fn test_kind_is_enforced() {
    let (codec, _) = codec();
    let access = codec.issue_access_default("a@x.com").unwrap();
    let refresh = codec.issue_refresh_default("a@x.com").unwrap();

    assert!(codec.decode_access(&access).is_ok());
    assert!(codec.decode_refresh(&refresh).is_ok());
    assert_eq!(codec.decode_access(&refresh).unwrap_err(), AuthError::TokenInvalid);
    assert_eq!(codec.decode_refresh(&access).unwrap_err(), AuthError::TokenInvalid);
}

#[test]
fn test_refresh_tokens_minted_together_differ() {
    let (codec, _) = codec();

    let first = codec.issue_refresh_default("a@x.com").unwrap();
    let second = codec.issue_refresh_default("a@x.com").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_decode_unchecked_expiry_reads_expired_token() {
    let (codec, clock) = codec();
    let token = codec
        .issue_refresh("a@x.com", Duration::from_secs(10))
        .unwrap();

    clock.advance_secs(3600);
    assert_eq!(codec.decode(&token).unwrap_err(), AuthError::TokenExpired);

    let claims = codec.decode_unchecked_expiry(&token).unwrap();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(codec.remaining_ttl(&claims), Duration::ZERO);
}
