//! Session lifecycle orchestration.
//!
//! [`SessionManager`] ties the stateless token logic to the shared session
//! store and the identity store. It is the only component that talks to
//! both.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use awladna_auth::{Principal, Role, RoleGuard, ScopedTokenService, TokenCodec, TokenPurpose};
use awladna_cache::SessionStore;
use awladna_config::LoginPolicyConfig;
use awladna_core::{AuthError, normalize_subject, parse_subject};
use awladna_core::password::{
    dummy_verify, hash_password_with_cost, is_legacy_digest, needs_rehash, verify_legacy_sha256,
    verify_password,
};
use awladna_models::{Credential, CredentialStore};
use awladna_observability::{
    track_jwt_issued, track_login_failure, track_login_success, track_refresh, track_revoke,
};

use super::model::{RefreshState, Registration, TokenPair};

const AUDIT: &str = "awladna::audit";

pub struct SessionManager {
    codec: TokenCodec,
    scoped: ScopedTokenService,
    sessions: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialStore>,
    policy: LoginPolicyConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .field("sessions", &self.sessions)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(
        codec: TokenCodec,
        scoped: ScopedTokenService,
        sessions: Arc<dyn SessionStore>,
        credentials: Arc<dyn CredentialStore>,
        policy: LoginPolicyConfig,
    ) -> Self {
        Self {
            codec,
            scoped,
            sessions,
            credentials,
            policy,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn scoped(&self) -> &ScopedTokenService {
        &self.scoped
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn policy(&self) -> &LoginPolicyConfig {
        &self.policy
    }

    /// Authenticates `subject` and mints an access/refresh pair.
    ///
    /// The subject is normalised first, so case and surrounding whitespace
    /// do not matter.
    ///
    /// Unknown subject, wrong password and unverified email are all
    /// `InvalidCredentials`. No tokens are returned unless the refresh record
    /// was written.
    #[instrument(skip(self, password))]
    pub async fn login(&self, subject: &str, password: &str) -> Result<TokenPair, AuthError> {
        let subject = normalize_subject(subject);
        let subject = subject.as_str();

        if let Err(e) = self.check_rate_limit(subject).await {
            track_login_failure(e.reason());
            return Err(e);
        }

        if let Err(e) = self.authenticate(subject, password).await {
            track_login_failure(e.reason());
            if e == AuthError::InvalidCredentials {
                self.record_failed_login(subject).await;
            }
            return Err(e);
        }

        let access_token = self.codec.issue_access_default(subject)?;
        track_jwt_issued("access");
        let refresh_token = self.codec.issue_refresh_default(subject)?;
        track_jwt_issued("refresh");

        if let Err(e) = self
            .sessions
            .store_refresh(subject, &refresh_token, self.codec.config().refresh_ttl())
            .await
        {
            warn!(error = %e, "Refresh record not written, login aborted");
            track_login_failure(e.reason());
            return Err(e);
        }

        self.clear_login_attempts(subject).await;

        track_login_success();
        info!(target: AUDIT, event = "login_success", subject = %subject);

        Ok(TokenPair::bearer(access_token, refresh_token))
    }

    async fn authenticate(&self, subject: &str, password: &str) -> Result<Credential, AuthError> {
        let Some(credential) = self.credentials.find_by_subject(subject).await? else {
            dummy_verify(password, self.policy.bcrypt_cost);
            info!(target: AUDIT, event = "login_failure", subject = %subject, reason = "unknown_subject");
            return Err(AuthError::InvalidCredentials);
        };

        let matched = if is_legacy_digest(&credential.password_hash) {
            if self.policy.allow_legacy_hashes {
                verify_legacy_sha256(password, &credential.password_hash)
            } else {
                warn!(subject = %subject, "Legacy password digest refused");
                dummy_verify(password, self.policy.bcrypt_cost);
                false
            }
        } else {
            verify_password(password, &credential.password_hash)
        };

        if !matched {
            info!(target: AUDIT, event = "login_failure", subject = %subject, reason = "bad_password");
            return Err(AuthError::InvalidCredentials);
        }

        if self.policy.require_verified_email && !credential.is_verified {
            info!(target: AUDIT, event = "login_failure", subject = %subject, reason = "unverified");
            return Err(AuthError::InvalidCredentials);
        }

        if needs_rehash(&credential.password_hash, self.policy.bcrypt_cost) {
            self.upgrade_password_hash(subject, password).await;
        }

        Ok(credential)
    }

    /// Replaces a legacy or weak digest after a successful login. Failure
    /// only costs the upgrade, never the login.
    async fn upgrade_password_hash(&self, subject: &str, password: &str) {
        let digest = match hash_password_with_cost(password, self.policy.bcrypt_cost) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(subject = %subject, error = %e, "Password re-hash failed");
                return;
            }
        };

        match self.credentials.update_password_hash(subject, &digest).await {
            Ok(()) => info!(target: AUDIT, event = "password_rehashed", subject = %subject),
            Err(e) => warn!(subject = %subject, error = %e, "Storing re-hashed password failed"),
        }
    }

    async fn check_rate_limit(&self, subject: &str) -> Result<(), AuthError> {
        if !self.policy.rate_limit_enabled() {
            return Ok(());
        }

        match self.sessions.login_attempts(subject).await {
            Ok(attempts) if attempts >= self.policy.max_attempts => {
                warn!(target: AUDIT, event = "login_locked", subject = %subject, attempts);
                Err(AuthError::TooManyAttempts)
            }
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Rate limiter unavailable, allowing login attempt");
                Ok(())
            }
        }
    }

    async fn record_failed_login(&self, subject: &str) {
        if !self.policy.rate_limit_enabled() {
            return;
        }

        let window = Duration::from_secs(self.policy.attempt_window_secs);
        match self.sessions.record_failed_login(subject, window).await {
            Ok(attempts) => debug!(subject = %subject, attempts, "Failed login counted"),
            Err(e) => warn!(error = %e, "Failed login not counted"),
        }
    }

    async fn clear_login_attempts(&self, subject: &str) {
        if !self.policy.rate_limit_enabled() {
            return;
        }

        if let Err(e) = self.sessions.clear_login_attempts(subject).await {
            warn!(error = %e, "Login attempt counter not cleared");
        }
    }

    /// Mints a new access token from a live refresh token.
    ///
    /// A revoke racing with this call may still let one access token
    /// through; the blacklist check and the issue are not atomic.
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let result = self.refresh_access(refresh_token).await;
        match &result {
            Ok(_) => track_refresh("ok"),
            Err(e) => track_refresh(e.reason()),
        }
        result
    }

    async fn refresh_access(&self, refresh_token: &str) -> Result<String, AuthError> {
        if self.sessions.is_revoked(refresh_token).await? {
            info!(target: AUDIT, event = "refresh_denied", reason = "revoked");
            return Err(AuthError::TokenRevoked);
        }

        let stored_subject = self
            .sessions
            .get_subject_for_refresh(refresh_token)
            .await?
            .ok_or(AuthError::TokenUnknownOrExpired)?;

        let claims = self.codec.decode_refresh(refresh_token)?;
        if claims.sub != stored_subject {
            warn!(
                target: AUDIT,
                event = "refresh_denied",
                reason = "subject_mismatch",
                subject = %claims.sub
            );
            return Err(AuthError::TokenInvalid);
        }

        let access_token = self.codec.issue_access_default(&claims.sub)?;
        track_jwt_issued("access");
        info!(target: AUDIT, event = "refresh", subject = %claims.sub);

        Ok(access_token)
    }

    /// Blacklists a token for the rest of its natural life.
    ///
    /// Idempotent. Expired or undecodable tokens are accepted without
    /// touching the store, since they can no longer be used anyway. Only
    /// `StoreUnavailable` is ever returned.
    #[instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = match self.codec.decode_unchecked_expiry(token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Revoke of undecodable token ignored");
                return Ok(());
            }
        };

        let remaining = self.codec.remaining_ttl(&claims);
        if remaining.is_zero() {
            debug!(subject = %claims.sub, "Revoke of expired token ignored");
            return Ok(());
        }

        self.sessions.revoke(token, remaining).await?;

        track_revoke();
        info!(
            target: AUDIT,
            event = "revoke",
            subject = %claims.sub,
            kind = claims.typ.as_str(),
            ttl_secs = remaining.as_secs()
        );
        Ok(())
    }

    /// Classifies a refresh token without side effects.
    pub async fn refresh_state(&self, refresh_token: &str) -> Result<RefreshState, AuthError> {
        let claims = match self.codec.decode_refresh(refresh_token) {
            Ok(claims) => claims,
            Err(AuthError::TokenExpired) => return Ok(RefreshState::Expired),
            Err(_) => return Ok(RefreshState::Invalid),
        };

        if self.sessions.is_revoked(refresh_token).await? {
            return Ok(RefreshState::Revoked);
        }

        let state = match self.sessions.get_subject_for_refresh(refresh_token).await? {
            Some(subject) if subject == claims.sub => RefreshState::Active,
            Some(_) => RefreshState::Invalid,
            None => RefreshState::Unknown,
        };
        Ok(state)
    }

    /// Resolves the caller behind an access token and checks its role.
    ///
    /// The role is read from the identity store, not the token, so role
    /// changes apply to already-issued tokens.
    #[instrument(skip(self, access_token))]
    pub async fn authorize(
        &self,
        access_token: &str,
        allowed_roles: &[Role],
    ) -> Result<Principal, AuthError> {
        let claims = self.codec.decode_access(access_token)?;

        let credential = self
            .credentials
            .find_by_subject(&claims.sub)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        let principal = Principal::new(credential.subject, credential.role);
        if let Err(e) = RoleGuard::require(&principal, allowed_roles) {
            info!(
                target: AUDIT,
                event = "access_denied",
                subject = %principal.subject,
                role = %principal.role
            );
            return Err(e);
        }

        Ok(principal)
    }

    /// Creates an unverified parent account under the normalised subject.
    /// Malformed emails and over-long passwords are `InvalidInput`. The
    /// returned verification token is for the mailer only.
    #[instrument(skip(self, password))]
    pub async fn register(&self, subject: &str, password: &str) -> Result<Registration, AuthError> {
        let subject = parse_subject(subject)?;
        let subject = subject.as_str();

        if self.credentials.find_by_subject(subject).await?.is_some() {
            return Err(AuthError::SubjectAlreadyExists);
        }

        let password_hash = hash_password_with_cost(password, self.policy.bcrypt_cost)?;
        let verification_token = self.scoped.issue(subject, TokenPurpose::EmailVerification)?;

        let mut credential = Credential::new(subject, password_hash, Role::Parent);
        credential.verification_token = Some(verification_token.clone());
        self.credentials.create(credential).await?;

        info!(target: AUDIT, event = "registered", subject = %subject);

        Ok(Registration {
            subject: subject.to_string(),
            verification_token,
        })
    }

    /// Marks the token's subject verified. Replaying a valid token is
    /// harmless.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, token: &str) -> Result<Credential, AuthError> {
        let subject = self
            .scoped
            .verify_default(token, TokenPurpose::EmailVerification)
            .ok_or(AuthError::TokenInvalid)?;

        if !self.credentials.mark_verified(&subject).await? {
            return Err(AuthError::TokenInvalid);
        }

        let credential = self
            .credentials
            .find_by_subject(&subject)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        info!(target: AUDIT, event = "email_verified", subject = %subject);
        Ok(credential)
    }

    pub fn issue_scoped_token(
        &self,
        subject: &str,
        purpose: TokenPurpose,
    ) -> Result<String, AuthError> {
        self.scoped.issue(subject, purpose)
    }

    pub fn verify_scoped_token(&self, token: &str, purpose: TokenPurpose) -> Option<String> {
        self.scoped.verify_default(token, purpose)
    }

    /// A reset token for a known subject, `None` otherwise. Callers must
    /// answer the same way in both cases.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, subject: &str) -> Result<Option<String>, AuthError> {
        let subject = normalize_subject(subject);
        let subject = subject.as_str();

        if self.credentials.find_by_subject(subject).await?.is_none() {
            debug!("Password reset requested for unknown subject");
            return Ok(None);
        }

        let token = self.scoped.issue(subject, TokenPurpose::PasswordReset)?;
        info!(target: AUDIT, event = "password_reset_requested", subject = %subject);
        Ok(Some(token))
    }

    /// Sets a new password for the reset token's subject.
    ///
    /// The token stays valid until its max age, so a replay inside the
    /// window can set the password again.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let subject = self
            .scoped
            .verify_default(token, TokenPurpose::PasswordReset)
            .ok_or(AuthError::TokenInvalid)?;

        if self.credentials.find_by_subject(&subject).await?.is_none() {
            return Err(AuthError::TokenInvalid);
        }

        let password_hash = hash_password_with_cost(new_password, self.policy.bcrypt_cost)?;
        self.credentials
            .update_password_hash(&subject, &password_hash)
            .await?;

        self.clear_login_attempts(&subject).await;
        info!(target: AUDIT, event = "password_reset", subject = %subject);
        Ok(())
    }
}
