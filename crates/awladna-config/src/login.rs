//! Login policy configuration.
//!
//! Controls brute-force protection on the login path and the password
//! migration behaviour.
//!
//! # Rate Limiting Strategy
//!
//! Failed attempts are counted per subject in a fixed window kept in the
//! session store. Once `max_attempts` is reached, further logins for that
//! subject are refused until the window expires. When the store is down the
//! limiter is skipped (fail open); revocation checks never are.

use tracing::warn;

use crate::{env_flag, env_parse};

/// bcrypt's accepted work factors.
const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// # Environment Variables
///
/// - `LOGIN_MAX_ATTEMPTS`: failed logins allowed per window (default: `5`)
/// - `LOGIN_ATTEMPT_WINDOW_SECS`: window length (default: `300`)
/// - `REQUIRE_VERIFIED_EMAIL`: refuse logins for unverified accounts (default: `true`)
/// - `ALLOW_LEGACY_PASSWORD_HASHES`: accept unsalted SHA-256 digests and re-hash them (default: `false`)
/// - `BCRYPT_COST`: bcrypt work factor for new digests, `4..=31` (default: `12`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginPolicyConfig {
    pub max_attempts: u64,
    pub attempt_window_secs: u64,
    pub require_verified_email: bool,
    pub allow_legacy_hashes: bool,
    pub bcrypt_cost: u32,
}

impl Default for LoginPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            attempt_window_secs: 300,
            require_verified_email: true,
            allow_legacy_hashes: false,
            bcrypt_cost: 12,
        }
    }
}

impl LoginPolicyConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse("LOGIN_MAX_ATTEMPTS").unwrap_or(defaults.max_attempts),
            attempt_window_secs: env_parse("LOGIN_ATTEMPT_WINDOW_SECS")
                .unwrap_or(defaults.attempt_window_secs),
            require_verified_email: env_flag("REQUIRE_VERIFIED_EMAIL")
                .unwrap_or(defaults.require_verified_email),
            allow_legacy_hashes: env_flag("ALLOW_LEGACY_PASSWORD_HASHES")
                .unwrap_or(defaults.allow_legacy_hashes),
            bcrypt_cost: checked_bcrypt_cost(env_parse("BCRYPT_COST"), defaults.bcrypt_cost),
        }
    }

    /// Rate limiting is off when `max_attempts` is zero.
    pub fn rate_limit_enabled(&self) -> bool {
        self.max_attempts > 0 && self.attempt_window_secs > 0
    }
}

fn checked_bcrypt_cost(cost: Option<u32>, default: u32) -> u32 {
    match cost {
        Some(cost) if BCRYPT_COST_RANGE.contains(&cost) => cost,
        Some(cost) => {
            warn!(cost, default, "BCRYPT_COST outside 4..=31, using the default");
            default
        }
        None => default,
    }
}
