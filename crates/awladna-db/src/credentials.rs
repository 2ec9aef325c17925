//! Postgres [`CredentialStore`] over the `users` table.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{error, instrument};

use awladna_auth::Role;
use awladna_core::AuthError;
use awladna_models::{Credential, CredentialStore};

#[derive(Debug, FromRow)]
struct CredentialRow {
    email: String,
    password_hash: String,
    role: String,
    is_verified: bool,
    verification_token: Option<String>,
}

impl TryFrom<CredentialRow> for Credential {
    type Error = AuthError;

    fn try_from(row: CredentialRow) -> Result<Self, Self::Error> {
        Ok(Credential {
            subject: row.email,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>()?,
            is_verified: row.is_verified,
            verification_token: row.verification_token,
        })
    }
}

/// Connection and pool failures are outages; anything else is a bug or bad
/// data and stays internal.
fn db_error(e: sqlx::Error) -> AuthError {
    error!(error = %e, "Credential store query failed");
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => AuthError::store_unavailable(e),
        _ => AuthError::internal(e),
    }
}

#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self))]
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Credential>, AuthError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT email, password_hash, role, is_verified, verification_token \
             FROM users WHERE email = $1",
        )
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Credential::try_from).transpose()
    }

    #[instrument(skip(self, credential), fields(subject = %credential.subject))]
    async fn create(&self, credential: Credential) -> Result<(), AuthError> {
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, role, is_verified, verification_token) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&credential.subject)
        .bind(&credential.password_hash)
        .bind(credential.role.as_str())
        .bind(credential.is_verified)
        .bind(&credential.verification_token)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::SubjectAlreadyExists)
            }
            Err(e) => Err(db_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn mark_verified(&self, subject: &str) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, verification_token = NULL, updated_at = NOW() \
             WHERE email = $1",
        )
        .bind(subject)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, token))]
    async fn set_verification_token(
        &self,
        subject: &str,
        token: Option<String>,
    ) -> Result<(), AuthError> {
        sqlx::query(
            "UPDATE users SET verification_token = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(subject)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password_hash(
        &self,
        subject: &str,
        password_hash: &str,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(subject)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::internal(format!("no credential for {}", subject)));
        }
        Ok(())
    }
}
