//! # Awladna Models
//!
//! Credential entities, the identity store contract and boundary DTOs.
//!
//! # Modules
//!
//! - [`auth`]: Login, refresh and reset request/response types
//! - [`credentials`]: [`Credential`] and the [`CredentialStore`] trait
//! - [`memory`]: [`MemoryCredentialStore`], an in-process identity store
//!
//! The Postgres implementation of [`CredentialStore`] lives in `awladna-db`.

pub mod auth;
pub mod credentials;
pub mod memory;

// Re-export commonly used types at crate root for convenience
pub use auth::{
    AccessTokenResponse, LoginRequest, MessageResponse, RefreshTokenRequest, Registration,
    ResetPasswordRequest, TokenPair,
};
pub use credentials::{Credential, CredentialStore};
pub use memory::MemoryCredentialStore;
