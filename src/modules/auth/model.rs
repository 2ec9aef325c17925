use std::fmt;

use serde::Serialize;

// Boundary DTOs live in awladna-models; re-exported here for handlers
pub use awladna_models::{
    AccessTokenResponse, LoginRequest, MessageResponse, RefreshTokenRequest, Registration,
    ResetPasswordRequest, TokenPair,
};

/// Where a refresh token sits in its lifecycle.
///
/// ```text
/// ISSUED --store_refresh--> ACTIVE --revoke--> REVOKED
///                             |
///                             +---- exp / record TTL ----> EXPIRED
/// ```
///
/// `Revoked` and `Expired` are terminal. `Unknown` covers tokens that verify
/// but have no refresh record, e.g. minted elsewhere or issued by a login
/// whose store write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    Active,
    Revoked,
    Expired,
    Unknown,
    Invalid,
}

impl RefreshState {
    pub fn is_usable(&self) -> bool {
        matches!(self, RefreshState::Active)
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefreshState::Active => "active",
            RefreshState::Revoked => "revoked",
            RefreshState::Expired => "expired",
            RefreshState::Unknown => "unknown",
            RefreshState::Invalid => "invalid",
        };
        f.write_str(s)
    }
}
