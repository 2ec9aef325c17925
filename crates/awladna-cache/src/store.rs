//! The session store contract.

use std::time::Duration;

use async_trait::async_trait;

use awladna_core::AuthError;

/// Shared key-value store for refresh-token records, the revocation
/// blacklist and login attempt counters.
///
/// Each operation touches a single key and is atomic on its own; nothing
/// here needs a multi-key transaction. Implementations must bound every
/// call and report an unreachable or slow backend as
/// [`AuthError::StoreUnavailable`] rather than hang.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Writes `token -> subject` expiring after `ttl`. Re-storing the same
    /// token overwrites the subject and resets the TTL.
    async fn store_refresh(&self, subject: &str, token: &str, ttl: Duration)
    -> Result<(), AuthError>;

    /// Subject for a stored refresh token, or `None` if absent or expired.
    async fn get_subject_for_refresh(&self, token: &str) -> Result<Option<String>, AuthError>;

    /// Blacklists `token` for `remaining_ttl`. The refresh record is left in
    /// place; the blacklist alone is authoritative for denial.
    async fn revoke(&self, token: &str, remaining_ttl: Duration) -> Result<(), AuthError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError>;

    /// Failed logins for `subject` in the current window.
    async fn login_attempts(&self, subject: &str) -> Result<u64, AuthError>;

    /// Counts a failed login. The window starts at the first failure and is
    /// not extended by later ones. Returns the new count.
    async fn record_failed_login(&self, subject: &str, window: Duration)
    -> Result<u64, AuthError>;

    async fn clear_login_attempts(&self, subject: &str) -> Result<(), AuthError>;

    /// Round trip to the backend.
    async fn ping(&self) -> Result<(), AuthError>;
}

/// Whole seconds for an expiry, rounded up and never below one second.
/// Redis rejects `SET EX 0`, and rounding down would let a record lapse
/// before the token it guards.
pub fn expiry_secs(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
