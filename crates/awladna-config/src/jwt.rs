use std::env;
use std::time::Duration;

use tracing::warn;

use crate::env_parse;

const DEV_SECRET: &str = "your-secret-key-change-in-production";

/// Signing and lifetime settings for session tokens.
///
/// # Environment Variables
///
/// - `APP_SECRET_KEY` (falls back to `JWT_SECRET`): HS256 signing secret
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: access-token lifetime (default: `30`)
/// - `REFRESH_TOKEN_EXPIRE_DAYS`: refresh-token lifetime (default: `7`)
/// - `JWT_LEEWAY_SECS`: grace period on expiry checks (default: `0`)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Access-token lifetime in seconds.
    pub access_token_expiry: i64,
    /// Refresh-token lifetime in seconds.
    pub refresh_token_expiry: i64,
    /// Seconds of clock-skew allowance on `exp`. Zero unless configured.
    pub leeway: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        let secret = env::var("APP_SECRET_KEY")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                warn!("APP_SECRET_KEY not set, using the development signing secret");
                DEV_SECRET.to_string()
            });

        Self {
            secret,
            access_token_expiry: lifetime_secs(env_parse("ACCESS_TOKEN_EXPIRE_MINUTES"), 30, 60),
            refresh_token_expiry: lifetime_secs(env_parse("REFRESH_TOKEN_EXPIRE_DAYS"), 7, 86_400),
            leeway: env_parse("JWT_LEEWAY_SECS").unwrap_or(0),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_token_expiry.max(0) as u64)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_token_expiry.max(0) as u64)
    }
}

/// `value` (or `default`) units converted to seconds, saturating at `i64::MAX`.
fn lifetime_secs(value: Option<i64>, default: i64, unit_secs: i64) -> i64 {
    value.unwrap_or(default).saturating_mul(unit_secs)
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            access_token_expiry: 30 * 60,
            refresh_token_expiry: 7 * 86_400,
            leeway: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lifetimes() {
        let config = JwtConfig::default();
        assert_eq!(config.access_ttl(), Duration::from_secs(1800));
        assert_eq!(config.refresh_ttl(), Duration::from_secs(604_800));
        assert_eq!(config.leeway, 0);
    }

    #[test]
    fn test_lifetime_secs() {
        assert_eq!(lifetime_secs(None, 30, 60), 1800);
        assert_eq!(lifetime_secs(Some(2), 30, 60), 120);
        assert_eq!(lifetime_secs(Some(i64::MAX), 7, 86_400), i64::MAX);
        assert_eq!(lifetime_secs(Some(i64::MIN), 7, 86_400), i64::MIN);
    }

    #[test]
    fn test_negative_lifetime_clamps_to_zero() {
        let config = JwtConfig {
            access_token_expiry: -5,
            ..JwtConfig::default()
        };
        assert_eq!(config.access_ttl(), Duration::ZERO);
    }
}
