//! JWT claim structures.
//!
//! - [`SessionClaims`]: access and refresh tokens, told apart by [`TokenKind`]
//! - [`ScopedClaims`]: purpose-bound email verification and password reset tokens

use serde::{Deserialize, Serialize};

/// Which session token a set of claims belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Claims carried by access and refresh tokens.
///
/// Validity depends only on the signature and `exp`; nothing here is looked
/// up server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (the account email)
    pub sub: String,
    /// Expiry, unix seconds
    pub exp: i64,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Unique token id so two tokens minted in the same second differ
    pub jti: String,
    /// Access or refresh
    pub typ: TokenKind,
}

/// Claims carried by purpose-scoped tokens.
///
/// There is no `exp`: the verifier decides the maximum age, so the same token
/// can be checked against different windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedClaims {
    pub sub: String,
    pub iat: i64,
    pub purpose: String,
}
