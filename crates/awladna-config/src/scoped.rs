//! Settings for purpose-scoped tokens (email verification, password reset).

use std::env;
use std::time::Duration;

use crate::env_parse;

/// # Environment Variables
///
/// - `APP_SECRET_KEY`: shared with session tokens unless `SCOPED_TOKEN_SECRET` is set
/// - `EMAIL_VERIFICATION_MAX_AGE_SECS` (default: `3600`)
/// - `PASSWORD_RESET_MAX_AGE_SECS` (default: `3600`)
#[derive(Clone, Debug)]
pub struct ScopedTokenConfig {
    pub secret: String,
    pub email_verification_max_age: Duration,
    pub password_reset_max_age: Duration,
}

impl ScopedTokenConfig {
    pub fn from_env() -> Self {
        let secret = env::var("SCOPED_TOKEN_SECRET")
            .or_else(|_| env::var("APP_SECRET_KEY"))
            .unwrap_or_else(|_| crate::JwtConfig::default().secret);

        Self {
            secret,
            email_verification_max_age: Duration::from_secs(
                env_parse("EMAIL_VERIFICATION_MAX_AGE_SECS").unwrap_or(3600),
            ),
            password_reset_max_age: Duration::from_secs(
                env_parse("PASSWORD_RESET_MAX_AGE_SECS").unwrap_or(3600),
            ),
        }
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Self::default()
        }
    }
}

impl Default for ScopedTokenConfig {
    fn default() -> Self {
        Self {
            secret: crate::JwtConfig::default().secret,
            email_verification_max_age: Duration::from_secs(3600),
            password_reset_max_age: Duration::from_secs(3600),
        }
    }
}
