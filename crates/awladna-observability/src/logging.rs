use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`. Anything other than `json` is compact.
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Builds the filter from `RUST_LOG`, falling back to `LOG_LEVEL`
/// (default: "info") with noisy dependencies held at warn.
fn env_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},sqlx=warn,redis=warn", log_level))
    })
}

/// Installs the global tracing subscriber.
///
/// # Configuration
///
/// - **Log Level**: `LOG_LEVEL` (default: "info"), overridden by `RUST_LOG`
/// - **Format**: `LOG_FORMAT=json` for one JSON object per line, compact otherwise
/// - **Audit**: security events are emitted on the `awladna::audit` target and
///   can be routed with a filter directive such as `awladna::audit=info`
///
/// Calling this more than once is harmless; only the first call installs.
pub fn init_tracing() {
    let layer = match LogFormat::from_env() {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_filter(env_filter())
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(env_filter())
            .boxed(),
    };

    let _ = tracing_subscriber::registry().with(layer).try_init();
}
