//! Error taxonomy for the authentication subsystem.
//!
//! Every fallible operation in the workspace returns [`AuthError`]. The
//! variants are precise so that logs and metrics can tell failures apart, but
//! callers at the boundary should only ever expose [`AuthError::outcome`],
//! which collapses them into a handful of opaque results. A caller must never
//! learn whether a login failed on the password or on the subject, or whether
//! a refresh token was revoked or merely expired.

use thiserror::Error;

/// Errors produced by token, credential and session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown subject, wrong password or unverified account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Malformed token, bad signature or wrong token type.
    #[error("Invalid token")]
    TokenInvalid,

    /// Signature is valid but `exp` has passed.
    #[error("Token expired")]
    TokenExpired,

    /// Refresh token is on the blacklist.
    #[error("Token revoked")]
    TokenRevoked,

    /// No refresh record exists for the token.
    #[error("Refresh token unknown or expired")]
    TokenUnknownOrExpired,

    /// Principal's role is not in the allowed set.
    #[error("Insufficient role")]
    InsufficientRole,

    /// The shared session store could not be reached in time.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Too many failed logins for a subject within the attempt window.
    #[error("Too many login attempts")]
    TooManyAttempts,

    /// Registration for a subject that already has a credential.
    #[error("Subject already registered")]
    SubjectAlreadyExists,

    /// Malformed subject or a password bcrypt cannot hash without truncation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Anything else (signing failures, identity store errors).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Opaque result classes exposed to callers of the boundary operations.
///
/// An HTTP layer would map these to 401, 403, 429, 409, 400, 503 and 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOutcome {
    Unauthorized,
    Forbidden,
    TooManyRequests,
    Conflict,
    BadRequest,
    Unavailable,
    Internal,
}

impl AuthOutcome {
    /// Fixed message that is safe to show to an unauthenticated caller.
    pub fn public_message(self) -> &'static str {
        match self {
            AuthOutcome::Unauthorized => "Could not validate credentials",
            AuthOutcome::Forbidden => "Forbidden",
            AuthOutcome::TooManyRequests => "Too many requests, slow down",
            AuthOutcome::Conflict => "Already registered",
            AuthOutcome::BadRequest => "Invalid request",
            AuthOutcome::Unavailable => "Service temporarily unavailable",
            AuthOutcome::Internal => "Internal server error",
        }
    }
}

impl AuthError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        AuthError::Internal(err.to_string())
    }

    pub fn invalid_input<E: std::fmt::Display>(err: E) -> Self {
        AuthError::InvalidInput(err.to_string())
    }

    pub fn store_unavailable<E: std::fmt::Display>(err: E) -> Self {
        AuthError::StoreUnavailable(err.to_string())
    }

    /// Collapses the error into the class a caller is allowed to see.
    pub fn outcome(&self) -> AuthOutcome {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::TokenUnknownOrExpired => AuthOutcome::Unauthorized,
            AuthError::InsufficientRole => AuthOutcome::Forbidden,
            AuthError::TooManyAttempts => AuthOutcome::TooManyRequests,
            AuthError::SubjectAlreadyExists => AuthOutcome::Conflict,
            AuthError::InvalidInput(_) => AuthOutcome::BadRequest,
            AuthError::StoreUnavailable(_) => AuthOutcome::Unavailable,
            AuthError::Internal(_) => AuthOutcome::Internal,
        }
    }

    /// Short stable label used for metrics and audit events.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenRevoked => "token_revoked",
            AuthError::TokenUnknownOrExpired => "token_unknown",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::TooManyAttempts => "too_many_attempts",
            AuthError::SubjectAlreadyExists => "subject_exists",
            AuthError::InvalidInput(_) => "invalid_input",
            AuthError::Internal(_) => "internal",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_are_indistinguishable_to_callers() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
            AuthError::TokenRevoked,
            AuthError::TokenUnknownOrExpired,
        ];
        for err in errors {
            assert_eq!(err.outcome(), AuthOutcome::Unauthorized);
            assert_eq!(
                err.outcome().public_message(),
                "Could not validate credentials"
            );
        }
    }

    #[test]
    fn test_store_unavailable_is_not_unauthorized() {
        let err = AuthError::store_unavailable("connection refused");
        assert_eq!(err.outcome(), AuthOutcome::Unavailable);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_role_failure_is_forbidden() {
        assert_eq!(AuthError::InsufficientRole.outcome(), AuthOutcome::Forbidden);
    }

    #[test]
    fn test_reason_labels_are_unique() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
            AuthError::TokenRevoked,
            AuthError::TokenUnknownOrExpired,
            AuthError::InsufficientRole,
            AuthError::StoreUnavailable(String::new()),
            AuthError::TooManyAttempts,
            AuthError::SubjectAlreadyExists,
            AuthError::InvalidInput(String::new()),
            AuthError::Internal(String::new()),
        ];
        let mut labels: Vec<_> = errors.iter().map(|e| e.reason()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), errors.len());
    }
}
