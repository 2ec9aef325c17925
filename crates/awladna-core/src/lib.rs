//! # Awladna Core
//!
//! Foundational types shared by every crate in the auth workspace:
//!
//! - [`errors`]: the [`AuthError`] taxonomy and its opaque [`AuthOutcome`] mapping
//! - [`clock`]: injectable wall clock ([`SystemClock`], [`ManualClock`])
//! - [`password`]: bcrypt hashing plus legacy SHA-256 migration helpers
//! - [`subject`]: email normalisation and validation for subjects
//!
//! # Example
//!
//! ```ignore
//! use awladna_core::password::{hash_password, verify_password};
//!
//! let digest = hash_password("secure_password")?;
//! assert!(verify_password("secure_password", &digest));
//! ```

pub mod clock;
pub mod errors;
pub mod password;
pub mod subject;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SharedClock, SystemClock, system_clock};
pub use errors::{AuthError, AuthOutcome, AuthResult};
pub use password::{hash_password, hash_password_with_cost, verify_password};
pub use subject::{normalize_subject, parse_subject};
