//! Auth counters.
//!
//! Counters are recorded through the `metrics` facade; the embedding
//! application installs whichever recorder/exporter it wants. With no
//! recorder installed every call is a no-op.

use metrics::counter;
use std::sync::OnceLock;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Check if observability is enabled via OBSERVABILITY_ENABLED env var
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true) // Enabled by default
    })
}

pub fn track_login_success() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_login_success_total").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_login_failure_total", "reason" => reason).increment(1);
}

/// `kind` is the token kind, `access` or `refresh`.
pub fn track_jwt_issued(kind: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_jwt_issued_total", "kind" => kind).increment(1);
}

/// `result` is `ok` or the failure reason.
pub fn track_refresh(result: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_refresh_total", "result" => result).increment(1);
}

pub fn track_revoke() {
    if !is_observability_enabled() {
        return;
    }
    counter!("auth_revoke_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_without_recorder_is_noop() {
        track_login_success();
        track_login_failure("invalid_credentials");
        track_jwt_issued("access");
        track_refresh("ok");
        track_revoke();
    }
}
