//! Key layout of the shared store.
//!
//! Every key the auth subsystem writes is built here, so the namespaces stay
//! collision-free:
//!
//! ```text
//! <prefix>:refresh_token:<token>        -> subject
//! <prefix>:blacklist:<token>            -> "1"
//! <prefix>:rate_limit:login:<subject>   -> failed attempt count
//! ```

use awladna_core::normalize_subject;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    prefix: String,
}

impl SessionKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    fn build_key(&self, parts: &[&str]) -> String {
        format!("{}:{}", self.prefix, parts.join(":"))
    }

    pub fn refresh_token(&self, token: &str) -> String {
        self.build_key(&["refresh_token", token])
    }

    pub fn blacklist(&self, token: &str) -> String {
        self.build_key(&["blacklist", token])
    }

    pub fn login_attempts(&self, subject: &str) -> String {
        self.build_key(&["rate_limit", "login", &normalize_subject(subject)])
    }
}

impl Default for SessionKeys {
    fn default() -> Self {
        Self::new("awladna")
    }
}

/// First ten characters of a token, for log lines.
pub fn token_preview(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(10)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaces_do_not_overlap() {
        let keys = SessionKeys::default();
        assert_eq!(keys.refresh_token("abc"), "awladna:refresh_token:abc");
        assert_eq!(keys.blacklist("abc"), "awladna:blacklist:abc");
        assert_ne!(keys.refresh_token("abc"), keys.blacklist("abc"));
    }

    #[test]
    fn test_login_attempt_key_is_case_insensitive() {
        let keys = SessionKeys::new("test");
        assert_eq!(
            keys.login_attempts("A@X.com"),
            "test:rate_limit:login:a@x.com"
        );
        assert_eq!(keys.login_attempts(" a@x.com "), keys.login_attempts("A@x.COM"));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijklmnop"), "abcdefghij");
        assert_eq!(token_preview("short"), "short");
    }
}
