//! In-process [`CredentialStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use awladna_core::AuthError;

use crate::credentials::{Credential, CredentialStore};

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given credentials. Later duplicates win.
    pub fn with_credentials(credentials: impl IntoIterator<Item = Credential>) -> Self {
        let map = credentials
            .into_iter()
            .map(|c| (c.subject.clone(), c))
            .collect();
        Self {
            credentials: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.credentials.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.credentials.read().await.is_empty()
    }

    async fn update<F>(&self, subject: &str, f: F) -> Result<bool, AuthError>
    where
        F: FnOnce(&mut Credential) + Send,
    {
        let mut credentials = self.credentials.write().await;
        match credentials.get_mut(subject) {
            Some(credential) => {
                f(credential);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, AuthError> {
        Ok(self.credentials.read().await.get(subject).cloned())
    }

    async fn create(&self, credential: Credential) -> Result<(), AuthError> {
        let mut credentials = self.credentials.write().await;
        if credentials.contains_key(&credential.subject) {
            return Err(AuthError::SubjectAlreadyExists);
        }
        credentials.insert(credential.subject.clone(), credential);
        Ok(())
    }

    async fn mark_verified(&self, subject: &str) -> Result<bool, AuthError> {
        self.update(subject, |c| {
            c.is_verified = true;
            c.verification_token = None;
        })
        .await
    }

    async fn set_verification_token(
        &self,
        subject: &str,
        token: Option<String>,
    ) -> Result<(), AuthError> {
        self.update(subject, |c| c.verification_token = token)
            .await
            .map(|_| ())
    }

    async fn update_password_hash(
        &self,
        subject: &str,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let found = self
            .update(subject, |c| c.password_hash = password_hash.to_string())
            .await?;
        if found {
            Ok(())
        } else {
            Err(AuthError::internal(format!("no credential for {}", subject)))
        }
    }
}
