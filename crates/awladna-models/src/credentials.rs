//! Stored credentials and the identity store contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use awladna_auth::Role;
use awladna_core::AuthError;

/// A stored identity. The subject is the account email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub subject: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    /// Outstanding email-verification token, cleared once verified.
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
}

impl Credential {
    /// A freshly registered, unverified account.
    pub fn new(subject: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            password_hash: password_hash.into(),
            role,
            is_verified: false,
            verification_token: None,
        }
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }
}

/// Read and narrow write access to the identity store.
///
/// The session layer never deletes identities; it only creates them at
/// registration and updates verification state and password digests.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, AuthError>;

    /// Inserts a new credential.
    ///
    /// # Errors
    ///
    /// `SubjectAlreadyExists` if the subject is taken.
    async fn create(&self, credential: Credential) -> Result<(), AuthError>;

    /// Marks the subject verified and clears its pending verification token.
    /// Returns `false` if the subject does not exist.
    async fn mark_verified(&self, subject: &str) -> Result<bool, AuthError>;

    async fn set_verification_token(
        &self,
        subject: &str,
        token: Option<String>,
    ) -> Result<(), AuthError>;

    async fn update_password_hash(&self, subject: &str, password_hash: &str)
    -> Result<(), AuthError>;
}
