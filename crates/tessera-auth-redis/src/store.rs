//! Redis-backed client registry and token store.
//!
//! Keyspace mapping:
//!
//! | trait operation  | Redis command(s)            |
//! |------------------|-----------------------------|
//! | `put_with_ttl`   | `SET key value EX ttl`      |
//! | `put`            | `SET key value`             |
//! | `get`            | `GET`                       |
//! | `get_with_ttl`   | `MULTI` `GET` `TTL` `EXEC`  |
//! | `delete`         | `DEL`                       |
//! | `take`           | `GETDEL`                    |
//! | `add_to_set`     | `SADD`                      |
//! | `members_of`     | `SMEMBERS`                  |
//! | `delete_many`    | `DEL key...`                |
//!
//! Client registrations live in the same keyspace as JSON values under
//! `oauth2.client:{client_id}`, written by [`RedisStorage::register_client`]
//! or external tooling.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use tessera_auth::types::keys;
use tessera_auth::{AuthError, AuthResult, Client, ClientStorage, TokenStorage};

/// Redis storage backend.
///
/// Cheap to clone; every clone shares the underlying multiplexed
/// connection.
#[derive(Clone)]
pub struct RedisStorage {
    conn: ConnectionManager,
}

impl RedisStorage {
    /// Connects to the given Redis URL (`redis://host:port/db`).
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the URL is invalid or the initial
    /// connection fails.
    pub async fn connect(url: &str) -> AuthResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| storage_err("open redis client", &e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| storage_err("connect to redis", &e))?;
        tracing::debug!("redis storage connected");
        Ok(Self { conn })
    }

    /// Wraps an existing connection manager.
    #[must_use]
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Registers (or replaces) a client record.
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the record cannot be encoded or
    /// written.
    pub async fn register_client(&self, client: &Client) -> AuthResult<()> {
        let payload = serde_json::to_string(client)
            .map_err(|e| AuthError::storage(format!("failed to encode client record: {e}")))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(keys::client(&client.client_id), payload)
            .await
            .map_err(|e| storage_err("register client", &e))?;
        Ok(())
    }
}

#[async_trait]
impl ClientStorage for RedisStorage {
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(keys::client(client_id))
            .await
            .map_err(|e| storage_err("find client", &e))?;
        match raw {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AuthError::storage(format!("malformed client record: {e}"))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TokenStorage for RedisStorage {
    async fn put_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(|e| storage_err("put with ttl", &e))?;
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(key, value)
            .await
            .map_err(|e| storage_err("put", &e))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(|e| storage_err("get", &e))
    }

    async fn get_with_ttl(&self, key: &str) -> AuthResult<Option<(String, Option<u64>)>> {
        let mut conn = self.conn.clone();
        // GET and TTL must see the same keyspace state, so run them in one
        // transaction.
        let (value, ttl): (Option<String>, i64) = redis::pipe()
            .atomic()
            .get(key)
            .ttl(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| storage_err("get with ttl", &e))?;
        Ok(value.map(|value| {
            // TTL reports -1 for keys without an expiry.
            let remaining = (ttl >= 0).then_some(ttl as u64);
            (value, remaining)
        }))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await.map_err(|e| storage_err("delete", &e))?;
        Ok(())
    }

    async fn take(&self, key: &str) -> AuthResult<Option<String>> {
        let mut conn = self.conn.clone();
        // GETDEL reads and removes in one server-side step; concurrent
        // takers of the same key get at most one value.
        conn.get_del(key).await.map_err(|e| storage_err("take", &e))
    }

    async fn add_to_set(&self, index_key: &str, members: &[String]) -> AuthResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = conn
            .sadd(index_key, members)
            .await
            .map_err(|e| storage_err("add to set", &e))?;
        Ok(())
    }

    async fn members_of(&self, index_key: &str) -> AuthResult<Vec<String>> {
        let mut conn = self.conn.clone();
        conn.smembers(index_key)
            .await
            .map_err(|e| storage_err("set members", &e))
    }

    async fn delete_many(&self, keys: &[String]) -> AuthResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(keys)
            .await
            .map_err(|e| storage_err("delete many", &e))?;
        Ok(())
    }
}

fn storage_err(op: &str, err: &redis::RedisError) -> AuthError {
    AuthError::storage(format!("redis {op} failed: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_record_roundtrip() {
        let client = Client::new("app123", "s3cr3t", "https://client.example/cb", "read");
        let raw = serde_json::to_string(&client).unwrap();
        let back: Client = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, client);
    }

    // Exercises the live command mapping; run with a local Redis:
    //   cargo test -p tessera-auth-redis -- --ignored
    #[tokio::test]
    #[ignore = "requires a running Redis at redis://127.0.0.1/"]
    async fn test_live_roundtrip() {
        let store = RedisStorage::connect("redis://127.0.0.1/").await.unwrap();

        store.put_with_ttl("tessera.test:k", "v", 60).await.unwrap();
        let (value, ttl) = store.get_with_ttl("tessera.test:k").await.unwrap().unwrap();
        assert_eq!(value, "v");
        assert!(ttl.unwrap() <= 60);

        assert_eq!(
            store.take("tessera.test:k").await.unwrap(),
            Some("v".to_string())
        );
        assert_eq!(store.take("tessera.test:k").await.unwrap(), None);

        store
            .add_to_set("tessera.test:idx", &["a".to_string()])
            .await
            .unwrap();
        assert_eq!(store.members_of("tessera.test:idx").await.unwrap(), vec!["a"]);
        store
            .delete_many(&["tessera.test:idx".to_string()])
            .await
            .unwrap();
    }
}
