//! # Awladna Cache
//!
//! Shared session state for the Awladna auth subsystem.
//!
//! This crate provides:
//! - The [`SessionStore`] contract: refresh-token records, the revocation
//!   blacklist and login attempt counters
//! - [`RedisSessionStore`], the production backend, with bounded command latency
//! - [`MemorySessionStore`], an in-process backend driven by an injectable clock
//! - Store configuration from environment variables
//!
//! # Example
//!
//! ```ignore
//! use awladna_cache::{CacheConfig, RedisSessionStore, SessionStore};
//!
//! let store = RedisSessionStore::connect(&CacheConfig::from_env()).await?;
//! store.store_refresh("a@x.com", &refresh_token, Duration::from_secs(604_800)).await?;
//! assert!(!store.is_revoked(&refresh_token).await?);
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use keys::SessionKeys;
pub use memory::MemorySessionStore;
pub use redis::RedisSessionStore;
pub use store::{SessionStore, expiry_secs};
