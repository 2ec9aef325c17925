//! # Awladna Auth
//!
//! Stateless token logic and authorization checks:
//!
//! - [`claims`]: claim structures for session and scoped tokens
//! - [`jwt`]: [`TokenCodec`], issuing and validating access/refresh tokens
//! - [`scoped`]: [`ScopedTokenService`], purpose-bound email verification and reset tokens
//! - [`guard`]: [`Role`], [`Principal`] and [`RoleGuard`]
//!
//! Nothing in this crate performs I/O. Revocation and refresh records live in
//! `awladna-cache`.

pub mod claims;
pub mod guard;
pub mod jwt;
pub mod scoped;

// Re-export commonly used types at crate root
pub use claims::{ScopedClaims, SessionClaims, TokenKind};
pub use guard::{Principal, Role, RoleGuard, role_hierarchy_level};
pub use jwt::TokenCodec;
pub use scoped::{ScopedTokenService, TokenPurpose};
