//! In-process [`SessionStore`] for tests, local development and the CLI.
//!
//! Entries expire against the injected [`Clock`](awladna_core::Clock), so
//! TTL behaviour can be exercised without sleeping. The store can be
//! switched off with [`MemorySessionStore::set_available`] to simulate an
//! outage.
//!
//! Expired entries are dropped when read, and every [`SWEEP_INTERVAL`]
//! writes a full sweep removes the ones nobody reads again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use awladna_core::{AuthError, SharedClock, system_clock};

use crate::keys::{SessionKeys, token_preview};
use crate::store::{SessionStore, expiry_secs};

/// Writes between two sweeps of expired entries.
pub const SWEEP_INTERVAL: u64 = 256;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: i64,
}

#[derive(Debug)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
    keys: SessionKeys,
    clock: SharedClock,
    available: AtomicBool,
    writes: AtomicU64,
}

impl MemorySessionStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            keys: SessionKeys::default(),
            clock,
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// When `false`, every operation fails with `StoreUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Remaining TTL of a raw key, `None` if missing or expired.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.now_ms();
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.expires_at_ms > now)
            .map(|e| Duration::from_millis((e.expires_at_ms - now) as u64))
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = self.now_ms();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at_ms > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::store_unavailable("memory store disabled"))
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.now_ms();
        let mut entries = self.entries.write().await;
        Self::sweep(&mut entries, now)
    }

    fn sweep(entries: &mut HashMap<String, Entry>, now: i64) -> usize {
        let before = entries.len();
        entries.retain(|_, e| e.expires_at_ms > now);
        let purged = before - entries.len();
        if purged > 0 {
            debug!(purged, remaining = entries.len(), "Expired session entries swept");
        }
        purged
    }

    /// Counts a write and sweeps when the interval is reached.
    fn sweep_if_due(&self, entries: &mut HashMap<String, Entry>, now: i64) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_INTERVAL == 0 {
            Self::sweep(entries, now);
        }
    }

    fn expires_at(now: i64, ttl: Duration) -> i64 {
        let ttl_ms = i64::try_from(expiry_secs(ttl))
            .unwrap_or(i64::MAX)
            .saturating_mul(1000);
        now.saturating_add(ttl_ms)
    }

    async fn put(&self, key: String, value: String, ttl: Duration) {
        let now = self.now_ms();
        let mut entries = self.entries.write().await;
        self.sweep_if_due(&mut entries, now);
        entries.insert(
            key,
            Entry {
                value,
                expires_at_ms: Self::expires_at(now, ttl),
            },
        );
    }

    #[cfg(test)]
    async fn raw_len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn get(&self, key: &str) -> Option<String> {
        let now = self.now_ms();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(system_clock())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn store_refresh(
        &self,
        subject: &str,
        token: &str,
        ttl: Duration,
    ) -> Result<(), AuthError> {
        self.check_available()?;
        self.put(self.keys.refresh_token(token), subject.to_string(), ttl)
            .await;
        debug!(token = %token_preview(token), "Refresh token stored");
        Ok(())
    }

    async fn get_subject_for_refresh(&self, token: &str) -> Result<Option<String>, AuthError> {
        self.check_available()?;
        Ok(self.get(&self.keys.refresh_token(token)).await)
    }

    async fn revoke(&self, token: &str, remaining_ttl: Duration) -> Result<(), AuthError> {
        self.check_available()?;
        self.put(self.keys.blacklist(token), "1".to_string(), remaining_ttl)
            .await;
        debug!(token = %token_preview(token), "Token blacklisted");
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        self.check_available()?;
        Ok(self.get(&self.keys.blacklist(token)).await.is_some())
    }

    async fn login_attempts(&self, subject: &str) -> Result<u64, AuthError> {
        self.check_available()?;
        let count = self
            .get(&self.keys.login_attempts(subject))
            .await
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        Ok(count)
    }

    async fn record_failed_login(
        &self,
        subject: &str,
        window: Duration,
    ) -> Result<u64, AuthError> {
        self.check_available()?;
        let key = self.keys.login_attempts(subject);
        let now = self.now_ms();

        let expires_at_ms = Self::expires_at(now, window);

        let mut entries = self.entries.write().await;
        self.sweep_if_due(&mut entries, now);
        let entry = entries
            .entry(key)
            .and_modify(|e| {
                if e.expires_at_ms <= now {
                    e.value = "0".into();
                    e.expires_at_ms = expires_at_ms;
                }
            })
            .or_insert_with(|| Entry {
                value: "0".into(),
                expires_at_ms,
            });

        let count = entry.value.parse::<u64>().unwrap_or(0) + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn clear_login_attempts(&self, subject: &str) -> Result<(), AuthError> {
        self.check_available()?;
        self.entries
            .write()
            .await
            .remove(&self.keys.login_attempts(subject));
        Ok(())
    }

    async fn ping(&self) -> Result<(), AuthError> {
        self.check_available()
    }
}
