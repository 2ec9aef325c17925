//! Purpose-scoped, time-boxed tokens for email verification and password reset.
//!
//! A scoped token is an HS256 JWT over [`ScopedClaims`]. Each purpose signs
//! with its own key, derived as `SHA-256(salt || "signer" || secret)`, so a
//! token minted for one purpose never validates for another even before the
//! embedded `purpose` claim is compared.
//!
//! These tokens are stateless. Nothing records that a token was used, so the
//! same token validates any number of times until it ages out. Single use is
//! the consumer's job: verifying an email flips a flag, which makes a second
//! submission a no-op. A stricter variant would need a server-side record of
//! consumed token ids.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sha2::{Digest, Sha256};
use tracing::debug;

use awladna_config::ScopedTokenConfig;
use awladna_core::{AuthError, SharedClock};

use crate::claims::ScopedClaims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    EmailVerification,
    PasswordReset,
}

impl TokenPurpose {
    pub const ALL: [TokenPurpose; 2] = [TokenPurpose::EmailVerification, TokenPurpose::PasswordReset];

    /// Wire tag, also used as the key-derivation salt.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::EmailVerification => "email-verification",
            TokenPurpose::PasswordReset => "password-reset",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenPurpose {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email-verification" => Ok(TokenPurpose::EmailVerification),
            "password-reset" => Ok(TokenPurpose::PasswordReset),
            other => Err(AuthError::internal(format!("Unknown token purpose: {}", other))),
        }
    }
}

#[derive(Clone)]
struct PurposeKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl PurposeKey {
    fn derive(secret: &str, purpose: TokenPurpose) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(purpose.as_str().as_bytes());
        hasher.update(b"signer");
        hasher.update(secret.as_bytes());
        let key = hasher.finalize();

        Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
        }
    }
}

#[derive(Clone)]
pub struct ScopedTokenService {
    config: ScopedTokenConfig,
    email_verification: PurposeKey,
    password_reset: PurposeKey,
    validation: Validation,
    clock: SharedClock,
}

impl fmt::Debug for ScopedTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTokenService")
            .field("email_verification_max_age", &self.config.email_verification_max_age)
            .field("password_reset_max_age", &self.config.password_reset_max_age)
            .finish_non_exhaustive()
    }
}

impl ScopedTokenService {
    pub fn new(config: ScopedTokenConfig, clock: SharedClock) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);

        Self {
            email_verification: PurposeKey::derive(&config.secret, TokenPurpose::EmailVerification),
            password_reset: PurposeKey::derive(&config.secret, TokenPurpose::PasswordReset),
            validation,
            config,
            clock,
        }
    }

    fn key(&self, purpose: TokenPurpose) -> &PurposeKey {
        match purpose {
            TokenPurpose::EmailVerification => &self.email_verification,
            TokenPurpose::PasswordReset => &self.password_reset,
        }
    }

    pub fn max_age(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::EmailVerification => self.config.email_verification_max_age,
            TokenPurpose::PasswordReset => self.config.password_reset_max_age,
        }
    }

    pub fn issue(&self, subject: &str, purpose: TokenPurpose) -> Result<String, AuthError> {
        let claims = ScopedClaims {
            sub: subject.to_string(),
            iat: self.clock.now_secs(),
            purpose: purpose.as_str().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.key(purpose).encoding)
            .map_err(|e| AuthError::internal(format!("Failed to create {} token: {}", purpose, e)))
    }

    /// Returns the subject if the token was minted for `purpose` and is no
    /// older than `max_age`. Every failure is `None`.
    pub fn verify(&self, token: &str, purpose: TokenPurpose, max_age: Duration) -> Option<String> {
        let claims = match decode::<ScopedClaims>(token, &self.key(purpose).decoding, &self.validation)
        {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(purpose = %purpose, error = %e, "Scoped token rejected");
                return None;
            }
        };

        if claims.purpose != purpose.as_str() {
            debug!(purpose = %purpose, "Scoped token purpose mismatch");
            return None;
        }

        let age = self.clock.now_secs().saturating_sub(claims.iat);
        if age > i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX) {
            debug!(purpose = %purpose, age_secs = age, "Scoped token too old");
            return None;
        }

        Some(claims.sub)
    }

    /// [`verify`](Self::verify) with the purpose's configured max age.
    pub fn verify_default(&self, token: &str, purpose: TokenPurpose) -> Option<String> {
        self.verify(token, purpose, self.max_age(purpose))
    }
}
