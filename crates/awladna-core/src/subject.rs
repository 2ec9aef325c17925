//! Subject (email) normalisation.
//!
//! Every subject entering the auth subsystem goes through
//! [`normalize_subject`] before it touches a store or a key, so
//! `A@X.com` and `a@x.com` always name the same account and share one
//! lockout counter. New accounts must additionally pass [`parse_subject`].
//!
//! # Example
//!
//! ```ignore
//! use awladna_core::subject::{normalize_subject, parse_subject};
//!
//! assert_eq!(normalize_subject("  Parent@Example.com "), "parent@example.com");
//! assert!(parse_subject("not-an-email").is_err());
//! ```

use validator::ValidateEmail;

use crate::errors::AuthError;

/// Canonical form of a subject: surrounding whitespace removed, lowercased.
pub fn normalize_subject(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalises `raw` and checks it is a usable email address.
pub fn parse_subject(raw: &str) -> Result<String, AuthError> {
    let subject = normalize_subject(raw);

    if subject.is_empty() {
        return Err(AuthError::invalid_input("email cannot be empty"));
    }

    if !subject.as_str().validate_email() {
        return Err(AuthError::invalid_input(format!(
            "'{}' is not a valid email address",
            subject
        )));
    }

    Ok(subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_subject() {
        assert_eq!(normalize_subject("a@x.com"), "a@x.com");
        assert_eq!(normalize_subject("  A@X.Com\n"), "a@x.com");
        assert_eq!(normalize_subject(""), "");
    }

    #[test]
    fn test_parse_subject_accepts_and_normalizes() {
        assert_eq!(parse_subject(" Parent@Example.com ").unwrap(), "parent@example.com");
    }

    #[test]
    fn test_parse_subject_rejects_malformed() {
        for raw in ["", "   ", "not-an-email", "a@", "@x.com", "a b@x.com"] {
            assert!(
                matches!(parse_subject(raw), Err(AuthError::InvalidInput(_))),
                "{raw:?}"
            );
        }
    }
}
