//! Awladna Observability Module
//!
//! Provides:
//! - Tracing subscriber setup (compact or JSON output, env-driven filtering)
//! - Auth metrics counters via the `metrics` facade
//!
//! Metrics can be compiled out with the `observability` feature flag. At
//! runtime they can be further disabled with `OBSERVABILITY_ENABLED=false`.
//!
//! # Features
//!
//! - `observability` (default): Enables metrics counters
//!
//! # Examples
//!
//! ```no_run
//! use awladna_observability::{init_tracing, track_login_success};
//!
//! init_tracing();
//! track_login_success();
//! ```

pub mod logging;
#[cfg(feature = "observability")]
pub mod metrics;

pub use logging::{LogFormat, init_tracing};

#[cfg(feature = "observability")]
pub use metrics::{
    is_observability_enabled, track_jwt_issued, track_login_failure, track_login_success,
    track_refresh, track_revoke,
};

// No-op stubs when observability is disabled
#[cfg(not(feature = "observability"))]
pub mod stubs {
    /// No-op observability check when feature disabled
    pub fn is_observability_enabled() -> bool {
        false
    }

    // No-op tracking functions
    pub fn track_login_success() {}
    pub fn track_login_failure(_reason: &'static str) {}
    pub fn track_jwt_issued(_kind: &'static str) {}
    pub fn track_refresh(_result: &'static str) {}
    pub fn track_revoke() {}
}

#[cfg(not(feature = "observability"))]
pub use stubs::*;
