//! Deterministic fixtures for exercising the session lifecycle.
//!
//! Everything runs in memory against a [`ManualClock`], so expiry can be
//! driven with `clock.advance_secs(..)` instead of sleeping.

use std::sync::Arc;

use awladna_auth::Role;
use awladna_cache::MemorySessionStore;
use awladna_config::{JwtConfig, LoginPolicyConfig, ScopedTokenConfig};
use awladna_core::ManualClock;
use awladna_core::password::{hash_password_with_cost, legacy_sha256_digest};
use awladna_models::{Credential, CredentialStore, MemoryCredentialStore};

use crate::modules::auth::SessionManager;
use crate::state::AppState;

/// Unix time every test clock starts at.
pub const TEST_EPOCH: i64 = 1_700_000_000;

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

/// bcrypt's minimum work factor keeps hashing fast in tests.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        access_token_expiry: 30 * 60,
        refresh_token_expiry: 7 * 24 * 60 * 60,
        leeway: 0,
    }
}

pub fn test_login_policy() -> LoginPolicyConfig {
    LoginPolicyConfig {
        bcrypt_cost: TEST_BCRYPT_COST,
        ..LoginPolicyConfig::default()
    }
}

pub struct TestContext {
    pub clock: Arc<ManualClock>,
    pub sessions: Arc<MemorySessionStore>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_policy(test_login_policy())
    }

    pub fn with_policy(policy: LoginPolicyConfig) -> Self {
        let clock = Arc::new(ManualClock::at_secs(TEST_EPOCH));
        let sessions = Arc::new(MemorySessionStore::new(clock.clone()));
        let credentials = Arc::new(MemoryCredentialStore::new());

        let state = AppState::from_parts(
            clock.clone(),
            sessions.clone(),
            credentials.clone(),
            test_jwt_config(),
            ScopedTokenConfig::with_secret(TEST_SECRET),
            policy,
        );

        Self {
            clock,
            sessions,
            credentials,
            state,
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.state.manager
    }

    /// Adds a verified account with a bcrypt digest.
    pub async fn seed_user(&self, subject: &str, password: &str, role: Role) -> Credential {
        let digest = hash_password_with_cost(password, TEST_BCRYPT_COST)
            .expect("hashing a test password");
        self.insert(Credential::new(subject, digest, role).verified())
            .await
    }

    /// Adds a verified account still carrying an unsalted SHA-256 digest.
    pub async fn seed_legacy_user(&self, subject: &str, password: &str, role: Role) -> Credential {
        self.insert(Credential::new(subject, legacy_sha256_digest(password), role).verified())
            .await
    }

    async fn insert(&self, credential: Credential) -> Credential {
        self.credentials
            .create(credential.clone())
            .await
            .expect("seeding a test credential");
        credential
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
