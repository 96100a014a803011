//! Storage traits for the protocol engine.
//!
//! The engine persists nothing itself; it consumes a client registry and a
//! TTL-capable key-value store through the traits below. Concrete backends
//! are supplied by dependency injection at provider construction.
//!
//! # Implementations
//!
//! - `tessera-auth-redis` - Redis backend (production)
//! - [`MemoryStorage`] - in-process backend for tests and development
//!
//! # Security Considerations
//!
//! - Never log keys containing codes or token values
//! - `take` must be atomic; a read followed by an unconditional delete
//!   reopens the double-exchange race the engine is built to close

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

pub mod memory;

pub use memory::MemoryStorage;

/// Client registry lookup.
///
/// Clients are registered and mutated outside the engine; this trait is the
/// engine's read-only window onto them.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Resolves a client by its identifier.
    ///
    /// # Returns
    ///
    /// Returns `Some(client)` if registered, `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be reached.
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>>;
}

/// TTL-capable key-value store with set-based indexing.
///
/// Values are opaque strings (the engine writes JSON session payloads).
/// Keys follow the [`crate::types::keys`] keyspace.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Writes a value that expires after `ttl_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn put_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> AuthResult<()>;

    /// Writes a value with no expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn put(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Reads a value.
    ///
    /// # Returns
    ///
    /// Returns `None` for absent or expired keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Reads a value together with its remaining lifetime in seconds.
    ///
    /// # Returns
    ///
    /// Returns `None` for absent or expired keys; `Some((value, None))` for
    /// keys without an expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn get_with_ttl(&self, key: &str) -> AuthResult<Option<(String, Option<u64>)>>;

    /// Deletes a key. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete(&self, key: &str) -> AuthResult<()>;

    /// Reads and deletes a key in one indivisible step.
    ///
    /// # Atomicity
    ///
    /// When several callers race on the same key, at most one observes
    /// `Some`; every other caller observes `None`. This is the primitive
    /// that makes authorization codes and refresh tokens single-use.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation fails.
    async fn take(&self, key: &str) -> AuthResult<Option<String>>;

    /// Adds members to the set stored at `index_key`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn add_to_set(&self, index_key: &str, members: &[String]) -> AuthResult<()>;

    /// Returns the members of the set stored at `index_key`.
    ///
    /// # Returns
    ///
    /// Returns an empty vector for an absent set.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn members_of(&self, index_key: &str) -> AuthResult<Vec<String>>;

    /// Deletes every listed key. Absent keys are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion fails.
    async fn delete_many(&self, keys: &[String]) -> AuthResult<()>;
}
