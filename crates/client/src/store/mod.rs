//! Persistent key/value storage for the endpoint and the session.
//!
//! Values are plain strings under fixed keys (see [`keys`]). There is no
//! transaction across keys: a crash between writing the token and writing
//! the role leaves a token with no cached role, which the session layer
//! recovers from by re-fetching the profile.

mod credentials;
mod file;
mod memory;

pub use credentials::{CredentialStore, StoredSession};
pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use thiserror::Error;

/// Storage keys.
pub mod keys {
    pub const SERVER_HOST: &str = "server_host";
    pub const SERVER_PORT: &str = "server_port";
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const USER_ID: &str = "user_id";
    pub const USER_ROLE: &str = "user_role";

    /// Keys removed when the session is purged.
    pub const SESSION: [&str; 3] = [AUTH_TOKEN, USER_ID, USER_ROLE];
}

/// Errors from a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt state file: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Asynchronous string key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}
