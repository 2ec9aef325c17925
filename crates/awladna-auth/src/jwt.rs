//! Session token codec.
//!
//! [`TokenCodec`] creates and validates the signed, self-contained access and
//! refresh tokens. Both are HS256 JWTs with the same claim shape
//! ([`SessionClaims`]); only the lifetime and the `typ` claim differ.
//!
//! Validation is a pure function of the signature and `exp` as read from the
//! injected [`Clock`](awladna_core::Clock). `jsonwebtoken`'s own expiry check
//! is disabled so that tests can drive time and so that no implicit leeway is
//! applied: a token is valid while `now <= exp + leeway`, with `leeway`
//! defaulting to zero.
//!
//! # Example
//!
//! ```ignore
//! use awladna_auth::TokenCodec;
//! use awladna_config::JwtConfig;
//! use awladna_core::system_clock;
//!
//! let codec = TokenCodec::new(JwtConfig::from_env(), system_clock());
//! let token = codec.issue_access_default("a@x.com")?;
//! let claims = codec.decode_access(&token)?;
//! assert_eq!(claims.sub, "a@x.com");
//! ```

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use awladna_config::JwtConfig;
use awladna_core::{AuthError, SharedClock};

use crate::claims::{SessionClaims, TokenKind};

#[derive(Clone)]
pub struct TokenCodec {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: SharedClock,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_token_expiry", &self.config.access_token_expiry)
            .field("refresh_token_expiry", &self.config.refresh_token_expiry)
            .field("leeway", &self.config.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: JwtConfig, clock: SharedClock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn issue_access(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue(subject, ttl, TokenKind::Access)
    }

    pub fn issue_refresh(&self, subject: &str, ttl: Duration) -> Result<String, AuthError> {
        self.issue(subject, ttl, TokenKind::Refresh)
    }

    pub fn issue_access_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_access(subject, self.config.access_ttl())
    }

    pub fn issue_refresh_default(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_refresh(subject, self.config.refresh_ttl())
    }

    fn issue(&self, subject: &str, ttl: Duration, kind: TokenKind) -> Result<String, AuthError> {
        let now = self.clock.now_secs();
        let claims = SessionClaims {
            sub: subject.to_string(),
            exp: now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            iat: now,
            jti: Uuid::new_v4().to_string(),
            typ: kind,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            AuthError::internal(format!("Failed to create {} token: {}", kind.as_str(), e))
        })
    }

    /// Verifies signature and expiry.
    ///
    /// Fails with exactly one of [`AuthError::TokenInvalid`] or
    /// [`AuthError::TokenExpired`]; parser details are discarded.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = self.decode_unchecked_expiry(token)?;
        if self.clock.now_secs() > claims.exp.saturating_add(self.config.leeway) {
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Like [`decode`](Self::decode) but also rejects refresh tokens.
    pub fn decode_access(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode_kind(token, TokenKind::Access)
    }

    /// Like [`decode`](Self::decode) but also rejects access tokens.
    pub fn decode_refresh(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.decode_kind(token, TokenKind::Refresh)
    }

    fn decode_kind(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, AuthError> {
        let claims = self.decode(token)?;
        if claims.typ != kind {
            return Err(AuthError::TokenInvalid);
        }
        Ok(claims)
    }

    /// Verifies the signature only. Expired tokens still decode.
    pub fn decode_unchecked_expiry(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// How much longer the token will be accepted, rounded up to whole
    /// seconds. Zero once it has expired.
    pub fn remaining_ttl(&self, claims: &SessionClaims) -> Duration {
        let valid_until_ms = claims
            .exp
            .saturating_add(self.config.leeway)
            .saturating_add(1)
            .saturating_mul(1000);
        let remaining_ms = valid_until_ms.saturating_sub(self.clock.now().timestamp_millis());
        if remaining_ms <= 0 {
            return Duration::ZERO;
        }
        let secs = remaining_ms / 1000 + i64::from(remaining_ms % 1000 != 0);
        Duration::from_secs(secs as u64)
    }
}
