//! # Awladna Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: session-token signing secret and lifetimes
//! - [`scoped`]: purpose-scoped token secret and max ages
//! - [`login`]: login rate limiting and password migration policy
//!
//! Every struct has a `Default` and a `from_env()` that falls back to the
//! default for any variable that is missing or unparsable.
//!
//! # Example
//!
//! ```ignore
//! use awladna_config::{JwtConfig, LoginPolicyConfig, ScopedTokenConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let scoped_config = ScopedTokenConfig::from_env();
//! let login_policy = LoginPolicyConfig::from_env();
//! ```

use std::str::FromStr;

pub mod jwt;
pub mod login;
pub mod scoped;

// Re-export commonly used types at crate root
pub use jwt::JwtConfig;
pub use login::LoginPolicyConfig;
pub use scoped::ScopedTokenConfig;

pub(crate) fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

pub(crate) fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}
