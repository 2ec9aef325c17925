//! Redis-backed [`SessionStore`].
//!
//! Every command runs under the configured operation timeout. Connection
//! errors, command errors and timeouts all surface as
//! [`AuthError::StoreUnavailable`], so callers never wait on a dead backend.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisResult, aio::ConnectionManager};
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use awladna_core::AuthError;

use crate::config::CacheConfig;
use crate::keys::{SessionKeys, token_preview};
use crate::store::{SessionStore, expiry_secs};

/// Redis session store with a shared multiplexed connection.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    keys: SessionKeys,
    op_timeout: Duration,
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionStore")
            .field("keys", &self.keys)
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisSessionStore {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::StoreUnavailable` if the URL is invalid or the
    /// server cannot be reached within the connect timeout.
    pub async fn connect(config: &CacheConfig) -> Result<Self, AuthError> {
        let client = Client::open(config.redis_url.as_str()).map_err(|e| {
            error!(error = %e, "Invalid Redis URL");
            AuthError::store_unavailable(e)
        })?;

        let conn = match timeout(config.connect_timeout(), ConnectionManager::new(client)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                error!(error = %e, "Failed to connect to Redis");
                return Err(AuthError::store_unavailable(e));
            }
            Err(_) => {
                error!(
                    timeout_ms = config.connect_timeout_ms,
                    "Timed out connecting to Redis"
                );
                return Err(AuthError::store_unavailable("connect timed out"));
            }
        };

        debug!(prefix = %config.key_prefix, "Connected to Redis session store");

        Ok(Self {
            conn,
            keys: SessionKeys::new(config.key_prefix.clone()),
            op_timeout: config.op_timeout(),
        })
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        command: impl Future<Output = RedisResult<T>>,
    ) -> Result<T, AuthError> {
        match timeout(self.op_timeout, command).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(cache.operation = operation, error = %e, "Redis command failed");
                Err(AuthError::store_unavailable(e))
            }
            Err(_) => {
                error!(
                    cache.operation = operation,
                    timeout_ms = self.op_timeout.as_millis() as u64,
                    "Redis command timed out"
                );
                Err(AuthError::store_unavailable(format!(
                    "{} timed out",
                    operation
                )))
            }
        }
    }

    /// Remaining TTL of a raw key, `None` if the key is missing or has no
    /// expiry.
    #[instrument(skip(self), fields(cache.operation = "TTL"))]
    pub async fn ttl(&self, key: &str) -> Result<Option<Duration>, AuthError> {
        let mut conn = self.conn.clone();
        let ttl: i64 = self.bounded("TTL", conn.ttl(key)).await?;

        // -1 (no expiry) or -2 (doesn't exist)
        Ok((ttl > 0).then(|| Duration::from_secs(ttl as u64)))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    #[instrument(skip_all, fields(cache.operation = "SETEX", token = %token_preview(token)))]
    async fn store_refresh(
        &self,
        subject: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.refresh_token(token);
        let secs = expiry_secs(ttl);

        self.bounded("SETEX", conn.set_ex::<_, _, ()>(&key, subject, secs))
            .await?;

        debug!(cache.ttl_secs = secs, "Refresh token stored");
        Ok(())
    }

    #[instrument(skip_all, fields(cache.operation = "GET", token = %token_preview(token)))]
    async fn get_subject_for_refresh(&self, token: &str) -> Result<Option<String>, AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.refresh_token(token);

        let subject: Option<String> = self.bounded("GET", conn.get(&key)).await?;
        Ok(subject)
    }

    #[instrument(skip_all, fields(cache.operation = "SETEX", token = %token_preview(token)))]
    async fn revoke(&self, token: &str, remaining_ttl: Duration) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.blacklist(token);
        let secs = expiry_secs(remaining_ttl);

        self.bounded("SETEX", conn.set_ex::<_, _, ()>(&key, "1", secs))
            .await?;

        debug!(cache.ttl_secs = secs, "Token blacklisted");
        Ok(())
    }

    #[instrument(skip_all, fields(cache.operation = "EXISTS", token = %token_preview(token)))]
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.blacklist(token);

        let exists: bool = self.bounded("EXISTS", conn.exists(&key)).await?;
        Ok(exists)
    }

    #[instrument(skip(self), fields(cache.operation = "GET"))]
    async fn login_attempts(&self, subject: &str) -> Result<u64, AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.login_attempts(subject);

        let count: Option<u64> = self.bounded("GET", conn.get(&key)).await?;
        Ok(count.unwrap_or(0))
    }

    #[instrument(skip(self), fields(cache.operation = "INCR"))]
    async fn record_failed_login(
        &self,
        subject: &str,
        window: Duration,
    ) -> Result<u64, AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.login_attempts(subject);

        // SET NX starts the window on the first failure only.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("EX")
            .arg(expiry_secs(window))
            .arg("NX")
            .ignore()
            .incr(&key, 1);

        let (count,): (u64,) = self.bounded("INCR", pipe.query_async(&mut conn)).await?;

        debug!(attempts = count, "Failed login recorded");
        Ok(count)
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    async fn clear_login_attempts(&self, subject: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let key = self.keys.login_attempts(subject);

        self.bounded("DEL", conn.del::<_, ()>(&key)).await
    }

    #[instrument(skip(self), fields(cache.operation = "PING"))]
    async fn ping(&self) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let _pong: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Integration tests require a running Redis instance at REDIS_URL

    async fn store() -> RedisSessionStore {
        let config = CacheConfig {
            key_prefix: format!("awladna-test-{}", std::process::id()),
            ..CacheConfig::from_env()
        };
        RedisSessionStore::connect(&config).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_refresh_round_trip() {
        let store = store().await;

        store
            .store_refresh("a@x.com", "redis-token-1", Duration::from_secs(60))
            .await
            .unwrap();

        let subject = store.get_subject_for_refresh("redis-token-1").await.unwrap();
        assert_eq!(subject.as_deref(), Some("a@x.com"));
        assert_eq!(store.get_subject_for_refresh("missing").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_revoke_sets_bounded_ttl() {
        let store = store().await;

        assert!(!store.is_revoked("redis-token-2").await.unwrap());
        store
            .revoke("redis-token-2", Duration::from_millis(4500))
            .await
            .unwrap();
        assert!(store.is_revoked("redis-token-2").await.unwrap());

        let key = store.keys().blacklist("redis-token-2");
        let ttl = store.ttl(&key).await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(5));
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn test_login_attempts_count_within_window() {
        let store = store().await;
        let subject = "counter@x.com";

        store.clear_login_attempts(subject).await.unwrap();
        assert_eq!(store.login_attempts(subject).await.unwrap(), 0);

        let window = Duration::from_secs(60);
        assert_eq!(store.record_failed_login(subject, window).await.unwrap(), 1);
        assert_eq!(store.record_failed_login(subject, window).await.unwrap(), 2);
        assert_eq!(store.login_attempts(subject).await.unwrap(), 2);

        store.clear_login_attempts(subject).await.unwrap();
        assert_eq!(store.login_attempts(subject).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_store_unavailable() {
        let config = CacheConfig {
            redis_url: "redis://127.0.0.1:1".into(),
            connect_timeout_ms: 200,
            ..CacheConfig::default()
        };

        let err = RedisSessionStore::connect(&config).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
    }
}
