//! Session store configuration.

use std::env;
use std::time::Duration;

/// Redis session store configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
/// - `CACHE_PREFIX`: Prefix for all session keys (default: `awladna`)
/// - `CACHE_OP_TIMEOUT_MS`: Upper bound on any single store call (default: `2000`)
/// - `CACHE_CONNECT_TIMEOUT_MS`: Upper bound on the initial connection (default: `5000`)
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Redis connection URL.
    pub redis_url: String,

    /// Prefix for all keys to avoid collisions with other Redis users.
    pub key_prefix: String,

    /// Timeout applied to every GET/SET/EXISTS, in milliseconds.
    pub op_timeout_ms: u64,

    /// Timeout for establishing the connection, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl CacheConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            key_prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.key_prefix),
            op_timeout_ms: env::var("CACHE_OP_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.op_timeout_ms),
            connect_timeout_ms: env::var("CACHE_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.connect_timeout_ms),
        }
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".into(),
            key_prefix: "awladna".into(),
            op_timeout_ms: 2000,
            connect_timeout_ms: 5000,
        }
    }
}
