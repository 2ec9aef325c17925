//! Explicit construction and teardown of the auth subsystem.
//!
//! Nothing here is global: every dependency is built once in
//! [`AppState::init`] (or handed in through [`AppState::from_parts`]) and
//! shared through `Arc`s.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use awladna_auth::{ScopedTokenService, TokenCodec};
use awladna_cache::{CacheConfig, MemorySessionStore, RedisSessionStore, SessionStore};
use awladna_config::{JwtConfig, LoginPolicyConfig, ScopedTokenConfig};
use awladna_core::{SharedClock, system_clock};
use awladna_db::{PgCredentialStore, PgPool, init_db_pool, run_migrations};
use awladna_models::{CredentialStore, MemoryCredentialStore};

use crate::modules::auth::SessionManager;

/// Which backend holds refresh records and the blacklist.
///
/// Read from `SESSION_STORE` (`redis`, the default, or `memory`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Redis,
    Memory,
}

impl SessionBackend {
    pub fn from_env() -> Self {
        match std::env::var("SESSION_STORE") {
            Ok(v) if v.eq_ignore_ascii_case("memory") => SessionBackend::Memory,
            _ => SessionBackend::Redis,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub clock: SharedClock,
    pub sessions: Arc<dyn SessionStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub manager: Arc<SessionManager>,
    db: Option<PgPool>,
}

impl AppState {
    /// Builds the subsystem from environment variables.
    ///
    /// The identity store is Postgres when `DATABASE_URL` is set and an
    /// empty in-memory store otherwise.
    pub async fn init() -> anyhow::Result<Self> {
        let clock = system_clock();

        let sessions = connect_sessions(&clock).await?;

        let (credentials, db): (Arc<dyn CredentialStore>, Option<PgPool>) =
            match std::env::var("DATABASE_URL") {
                Ok(url) => {
                    let pool = init_db_pool(&url)
                        .await
                        .context("Failed to connect to database")?;
                    run_migrations(&pool)
                        .await
                        .context("Failed to run database migrations")?;
                    (Arc::new(PgCredentialStore::new(pool.clone())), Some(pool))
                }
                Err(_) => {
                    warn!("DATABASE_URL not set, using in-memory credential store");
                    (Arc::new(MemoryCredentialStore::new()), None)
                }
            };

        let mut state = Self::from_parts(
            clock,
            sessions,
            credentials,
            JwtConfig::from_env(),
            ScopedTokenConfig::from_env(),
            LoginPolicyConfig::from_env(),
        );
        state.db = db;

        info!("Auth subsystem initialized");
        Ok(state)
    }

    /// Wires already-built stores together. Used by tests and embedders
    /// that manage their own connections.
    pub fn from_parts(
        clock: SharedClock,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
        jwt_config: JwtConfig,
        scoped_config: ScopedTokenConfig,
        policy: LoginPolicyConfig,
    ) -> Self {
        let codec = TokenCodec::new(jwt_config, clock.clone());
        let scoped = ScopedTokenService::new(scoped_config, clock.clone());
        let manager = SessionManager::new(
            codec,
            scoped,
            sessions.clone(),
            credentials.clone(),
            policy,
        );

        Self {
            clock,
            sessions,
            credentials,
            manager: Arc::new(manager),
            db: None,
        }
    }

    /// Closes the database pool. The Redis connection manager closes when
    /// its last handle drops.
    pub async fn shutdown(self) {
        if let Some(pool) = self.db {
            pool.close().await;
        }
        info!("Auth subsystem shut down");
    }
}

/// Connects the configured session backend.
pub async fn connect_sessions(clock: &SharedClock) -> anyhow::Result<Arc<dyn SessionStore>> {
    let store: Arc<dyn SessionStore> = match SessionBackend::from_env() {
        SessionBackend::Redis => {
            let config = CacheConfig::from_env();
            let store = RedisSessionStore::connect(&config)
                .await
                .with_context(|| format!("Failed to connect to Redis at {}", config.redis_url))?;
            Arc::new(store)
        }
        SessionBackend::Memory => {
            warn!("Using in-memory session store; sessions are lost on exit");
            Arc::new(MemorySessionStore::new(clock.clone()))
        }
    };
    Ok(store)
}
