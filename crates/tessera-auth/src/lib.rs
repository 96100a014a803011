//! # tessera-auth
//!
//! OAuth 2.0 authorization-server protocol engine.
//!
//! This crate provides:
//! - Authorization-code grant flow (issuance and exchange)
//! - Refresh-token grant flow with single-use rotation
//! - Bearer-token validation for resource requests
//! - Token/code lifecycle management (TTL-bound persistence, single-use
//!   consumption, bulk revocation)
//! - Redirect and JSON response construction for both endpoint families
//!
//! ## Overview
//!
//! The engine is storage-agnostic: it consumes persistence through the
//! [`storage::ClientStorage`] and [`storage::TokenStorage`] traits and
//! performs no I/O of its own beyond those traits. Concrete backends are
//! supplied by dependency injection at construction; a Redis backend lives
//! in the `tessera-auth-redis` crate, and [`storage::MemoryStorage`] serves
//! tests and development.
//!
//! ## Modules
//!
//! - [`config`] - Provider configuration (token length, lifetimes)
//! - [`error`] - Error taxonomy and OAuth 2.0 error-code mapping
//! - [`generate`] - Random token/code generation
//! - [`oauth`] - The protocol flows, wire types, and response construction
//! - [`storage`] - Storage traits and the in-memory backend
//! - [`types`] - Client records, session payloads, and the keyspace

pub mod config;
pub mod error;
pub mod generate;
pub mod oauth;
pub mod storage;
pub mod types;

pub use config::ProviderConfig;
pub use error::AuthError;
pub use generate::TokenGenerator;
pub use oauth::provider::AuthorizationProvider;
pub use oauth::resource::{ResourceAuthorization, ResourceProvider};
pub use oauth::response::ProviderResponse;
pub use storage::{ClientStorage, MemoryStorage, TokenStorage};
pub use types::{Client, SessionData};

/// Type alias for protocol-engine results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tessera_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::ProviderConfig;
    pub use crate::error::AuthError;
    pub use crate::generate::TokenGenerator;
    pub use crate::oauth::authorize::{AuthorizeRedirect, AuthorizeRequest};
    pub use crate::oauth::provider::AuthorizationProvider;
    pub use crate::oauth::resource::{ResourceAuthorization, ResourceProvider};
    pub use crate::oauth::response::ProviderResponse;
    pub use crate::oauth::token::{TokenGrant, TokenRequest};
    pub use crate::storage::{ClientStorage, MemoryStorage, TokenStorage};
    pub use crate::types::{Client, SessionData};
}
