#![allow(dead_code)]

pub use awladna::testing::{TEST_BCRYPT_COST, TEST_EPOCH, TEST_SECRET, TestContext};

pub const PASSWORD: &str = "pw";

/// Generate a unique email for test isolation
pub fn generate_unique_email(prefix: &str) -> String {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!(
        "{}-{}@x.com",
        prefix,
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
