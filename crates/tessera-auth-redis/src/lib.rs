//! # tessera-auth-redis
//!
//! Redis storage backend for the `tessera-auth` protocol engine.
//!
//! Implements the engine's [`ClientStorage`](tessera_auth::ClientStorage)
//! and [`TokenStorage`](tessera_auth::TokenStorage) traits over a
//! multiplexed, auto-reconnecting connection. Single-use consumption maps
//! to `GETDEL`, so the "take" of a code or refresh token is one atomic
//! server-side step.

mod store;

pub use store::RedisStorage;
