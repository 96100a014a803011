//! In-process storage backend.
//!
//! Backs the engine's tests and development setups. TTL semantics are
//! enforced on read: an entry past its deadline is dropped by the first
//! operation that touches it. `take` removes under a single lock, which
//! gives it the same at-most-one-winner guarantee the Redis backend gets
//! from `GETDEL`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::storage::{ClientStorage, TokenStorage};
use crate::types::Client;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<OffsetDateTime>,
}

impl Entry {
    fn expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => OffsetDateTime::now_utc() >= deadline,
            None => false,
        }
    }

    fn remaining_secs(&self) -> Option<u64> {
        self.expires_at.map(|deadline| {
            (deadline - OffsetDateTime::now_utc())
                .whole_seconds()
                .max(0) as u64
        })
    }
}

/// In-memory client registry and token store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    clients: Mutex<HashMap<String, Client>>,
    entries: Mutex<HashMap<String, Entry>>,
    sets: Mutex<HashMap<String, BTreeSet<String>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a client.
    pub fn register_client(&self, client: Client) {
        let mut clients = self.clients.lock().expect("client registry poisoned");
        clients.insert(client.client_id.clone(), client);
    }

    /// Number of live key-value entries. Handy for asserting that a failed
    /// validation wrote nothing.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.lock().expect("entry map poisoned").len()
    }
}

/// Drops the entry at `key` if it has outlived its TTL.
fn purge_if_expired(entries: &mut HashMap<String, Entry>, key: &str) {
    if entries.get(key).is_some_and(Entry::expired) {
        entries.remove(key);
    }
}

#[async_trait]
impl ClientStorage for MemoryStorage {
    async fn find_client(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let clients = self.clients.lock().expect("client registry poisoned");
        Ok(clients.get(client_id).cloned())
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn put_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> AuthResult<()> {
        let expires_at = OffsetDateTime::now_utc() + Duration::seconds(ttl_seconds as i64);
        let mut entries = self.entries.lock().expect("entry map poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(expires_at),
            },
        );
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> AuthResult<()> {
        let mut entries = self.entries.lock().expect("entry map poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut entries = self.entries.lock().expect("entry map poisoned");
        purge_if_expired(&mut entries, key);
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn get_with_ttl(&self, key: &str) -> AuthResult<Option<(String, Option<u64>)>> {
        let mut entries = self.entries.lock().expect("entry map poisoned");
        purge_if_expired(&mut entries, key);
        Ok(entries
            .get(key)
            .map(|entry| (entry.value.clone(), entry.remaining_secs())))
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.entries.lock().expect("entry map poisoned").remove(key);
        self.sets.lock().expect("set map poisoned").remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> AuthResult<Option<String>> {
        let mut entries = self.entries.lock().expect("entry map poisoned");
        match entries.remove(key) {
            Some(entry) if entry.expired() => Ok(None),
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    async fn add_to_set(&self, index_key: &str, members: &[String]) -> AuthResult<()> {
        let mut sets = self.sets.lock().expect("set map poisoned");
        let set = sets.entry(index_key.to_string()).or_default();
        set.extend(members.iter().cloned());
        Ok(())
    }

    async fn members_of(&self, index_key: &str) -> AuthResult<Vec<String>> {
        let sets = self.sets.lock().expect("set map poisoned");
        Ok(sets
            .get(index_key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_many(&self, keys: &[String]) -> AuthResult<()> {
        let mut entries = self.entries.lock().expect("entry map poisoned");
        let mut sets = self.sets.lock().expect("set map poisoned");
        for key in keys {
            entries.remove(key);
            sets.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStorage::new();
        store.put("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_zero_expires_immediately() {
        let store = MemoryStorage::new();
        store.put_with_ttl("k", "v", 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_with_ttl_reports_remaining() {
        let store = MemoryStorage::new();
        store.put_with_ttl("k", "v", 3600).await.unwrap();
        let (value, ttl) = store.get_with_ttl("k").await.unwrap().unwrap();
        assert_eq!(value, "v");
        let ttl = ttl.unwrap();
        assert!(ttl <= 3600 && ttl > 3590, "remaining ttl was {ttl}");

        store.put("persistent", "v").await.unwrap();
        let (_, ttl) = store.get_with_ttl("persistent").await.unwrap().unwrap();
        assert_eq!(ttl, None);
    }

    #[tokio::test]
    async fn test_take_is_single_winner() {
        let store = MemoryStorage::new();
        store.put("k", "v").await.unwrap();
        assert_eq!(store.take("k").await.unwrap(), Some("v".to_string()));
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_take_of_expired_entry() {
        let store = MemoryStorage::new();
        store.put_with_ttl("k", "v", 0).await.unwrap();
        assert_eq!(store.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = MemoryStorage::new();
        store
            .add_to_set("idx", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        store.add_to_set("idx", &["b".to_string()]).await.unwrap();
        assert_eq!(store.members_of("idx").await.unwrap(), vec!["a", "b"]);

        store.delete_many(&["idx".to_string()]).await.unwrap();
        assert!(store.members_of("idx").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_registry() {
        let store = MemoryStorage::new();
        store.register_client(Client::new("app", "secret", "https://x/cb", "read"));
        let found = store.find_client("app").await.unwrap().unwrap();
        assert_eq!(found.client_id, "app");
        assert_eq!(store.find_client("other").await.unwrap(), None);
    }
}
