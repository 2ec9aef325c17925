//! Password hashing and verification.
//!
//! New digests are always bcrypt. The previous backend stored unsalted hex
//! SHA-256 digests; those are recognised by [`is_legacy_digest`] and can be
//! checked with [`verify_legacy_sha256`] so accounts can be migrated by
//! re-hashing on their next successful login.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused by [`hash_password_with_cost`] and never verify, so two passwords
//! sharing a 72-byte prefix cannot stand in for each other.

use std::sync::OnceLock;

use bcrypt::{DEFAULT_COST, hash, verify};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::AuthError;

/// Lowest cost bcrypt accepts (mirrors bcrypt's private `MIN_COST`).
pub const MIN_COST: u32 = 4;
/// Highest cost bcrypt accepts (mirrors bcrypt's private `MAX_COST`).
pub const MAX_COST: u32 = 31;

/// Longest password bcrypt hashes without truncation.
pub const MAX_PASSWORD_BYTES: usize = 72;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::invalid_input(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    hash(password, cost)
        .map_err(|e| AuthError::internal(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a bcrypt `digest`.
///
/// Never fails: a digest bcrypt cannot parse is treated as a mismatch, and
/// so is a password longer than [`MAX_PASSWORD_BYTES`].
pub fn verify_password(password: &str, digest: &str) -> bool {
    if password.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    match verify(password, digest) {
        Ok(valid) => valid,
        Err(e) => {
            warn!(error = %e, "Stored password digest could not be parsed");
            false
        }
    }
}

/// Burns roughly the same CPU as a real verification. Used when the subject
/// is unknown so response timing does not reveal whether it exists.
pub fn dummy_verify(password: &str, cost: u32) {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    if let Some(digest) = DUMMY.get_or_init(|| dummy_digest(cost)) {
        let _ = verify_password(password, digest);
    }
}

/// Digest for [`dummy_verify`]. An unusable `cost` falls back to the
/// default so the dummy work is never skipped.
fn dummy_digest(cost: u32) -> Option<String> {
    const DUMMY_PASSWORD: &str = "awladna-dummy-password";

    let cost = if (MIN_COST..=MAX_COST).contains(&cost) {
        cost
    } else {
        warn!(cost, "bcrypt cost out of range, dummy digest uses the default");
        DEFAULT_COST
    };
    match hash(DUMMY_PASSWORD, cost) {
        Ok(digest) => Some(digest),
        Err(e) => {
            warn!(error = %e, "Dummy digest could not be created");
            None
        }
    }
}

/// True for 64-character lowercase hex strings, the legacy SHA-256 format.
pub fn is_legacy_digest(digest: &str) -> bool {
    digest.len() == 64 && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Unsalted hex SHA-256, as produced by the previous backend.
pub fn legacy_sha256_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn verify_legacy_sha256(password: &str, digest: &str) -> bool {
    if !is_legacy_digest(digest) {
        return false;
    }
    constant_time_eq(legacy_sha256_digest(password).as_bytes(), digest.as_bytes())
}

/// Whether a stored digest should be replaced after a successful login.
pub fn needs_rehash(digest: &str, cost: u32) -> bool {
    if is_legacy_digest(digest) {
        return true;
    }
    match bcrypt_cost(digest) {
        Some(stored) => stored < cost,
        None => true,
    }
}

/// Extracts the cost factor from a `$2b$12$...` style digest.
fn bcrypt_cost(digest: &str) -> Option<u32> {
    let mut parts = digest.split('$');
    parts.next()?;
    let variant = parts.next()?;
    if !variant.starts_with('2') {
        return None;
    }
    parts.next()?.parse().ok()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
