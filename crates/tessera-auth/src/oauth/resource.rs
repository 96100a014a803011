//! Bearer-token validation for resource requests.
//!
//! The resource provider reads token state without mutating it. A missing
//! or non-Bearer credential is unauthenticated rather than an error; a
//! Bearer token that fails to resolve is `access_denied`.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::TokenStorage;
use crate::types::{SessionData, keys};

/// The request-scoped result of validating a bearer credential.
///
/// A fresh value is constructed per request; it is never shared or reused.
#[derive(Debug, Clone, Default)]
pub struct ResourceAuthorization {
    /// Whether the request carried a Bearer credential at all.
    pub is_bearer: bool,

    /// Whether the credential resolved to a live access token.
    pub is_valid: bool,

    /// The presented token, when one was parsed.
    pub token: Option<String>,

    /// Client the token was issued to, when valid.
    pub client_id: Option<String>,

    /// Resource owner recorded with the token, when present.
    pub user_id: Option<String>,

    /// Remaining token lifetime in seconds, when valid and TTL-bound.
    pub expires_in: Option<u64>,

    /// Why validation failed, when it did. Absent for unauthenticated
    /// requests.
    pub error: Option<&'static str>,
}

impl ResourceAuthorization {
    /// Returns an `access_denied` error unless the credential validated.
    ///
    /// Callers that allow anonymous access simply skip this check.
    ///
    /// # Errors
    ///
    /// Returns `AccessDenied` for any invalid result, including
    /// unauthenticated requests.
    pub fn ensure_valid(&self) -> AuthResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(AuthError::access_denied("authorization required"))
        }
    }
}

/// Validates inbound bearer credentials against the token store.
pub struct ResourceProvider {
    tokens: Arc<dyn TokenStorage>,
}

impl ResourceProvider {
    /// Creates a resource provider over the given token store.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenStorage>) -> Self {
        Self { tokens }
    }

    /// Validates the value of an `Authorization` header, if one was sent.
    ///
    /// Absent or malformed headers produce an invalid result with no error
    /// (unauthenticated). A parsed Bearer token is looked up in the store:
    /// found and unexpired populates `client_id`, `user_id`, and the
    /// remaining `expires_in`; anything else is `access_denied`. Store
    /// state is never mutated.
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the store cannot be reached.
    pub async fn authorize_header(
        &self,
        header: Option<&str>,
    ) -> AuthResult<ResourceAuthorization> {
        let mut auth = ResourceAuthorization::default();

        let Some(header) = header else {
            return Ok(auth);
        };
        let mut parts = header.split_whitespace();
        let (Some("Bearer"), Some(token)) = (parts.next(), parts.next()) else {
            return Ok(auth);
        };

        auth.is_bearer = true;
        auth.token = Some(token.to_string());

        match self.tokens.get_with_ttl(&keys::access_token(token)).await? {
            Some((raw, ttl)) => {
                let data = SessionData::from_json(&raw)?;
                auth.is_valid = true;
                auth.client_id = Some(data.client_id);
                auth.user_id = data.user_id;
                auth.expires_in = ttl;
            }
            None => {
                auth.error = Some("access_denied");
            }
        }

        Ok(auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn provider(store: Arc<MemoryStorage>) -> ResourceProvider {
        ResourceProvider::new(store)
    }

    async fn seed_token(store: &MemoryStorage, token: &str, ttl: u64) {
        let data = SessionData::new("app123", "read").with_user_id("user-9");
        store
            .put_with_ttl(&keys::access_token(token), &data.to_json().unwrap(), ttl)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let store = Arc::new(MemoryStorage::new());
        let auth = provider(store).authorize_header(None).await.unwrap();
        assert!(!auth.is_bearer);
        assert!(!auth.is_valid);
        assert!(auth.error.is_none());
        assert!(auth.ensure_valid().is_err());
    }

    #[tokio::test]
    async fn test_malformed_header_is_unauthenticated() {
        let store = Arc::new(MemoryStorage::new());
        let provider = provider(store);
        for header in ["Basic dXNlcjpwYXNz", "Bearer", "tok123"] {
            let auth = provider.authorize_header(Some(header)).await.unwrap();
            assert!(!auth.is_valid, "header: {header}");
            assert!(auth.error.is_none(), "header: {header}");
        }
    }

    #[tokio::test]
    async fn test_valid_token() {
        let store = Arc::new(MemoryStorage::new());
        seed_token(&store, "tok123", 3600).await;
        let auth = provider(store)
            .authorize_header(Some("Bearer tok123"))
            .await
            .unwrap();
        assert!(auth.is_bearer);
        assert!(auth.is_valid);
        assert_eq!(auth.client_id.as_deref(), Some("app123"));
        assert_eq!(auth.user_id.as_deref(), Some("user-9"));
        assert!(auth.expires_in.unwrap() <= 3600);
        assert!(auth.ensure_valid().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_token_is_denied() {
        let store = Arc::new(MemoryStorage::new());
        let auth = provider(store)
            .authorize_header(Some("Bearer nope"))
            .await
            .unwrap();
        assert!(auth.is_bearer);
        assert!(!auth.is_valid);
        assert_eq!(auth.error, Some("access_denied"));
    }

    #[tokio::test]
    async fn test_expired_token_is_denied() {
        let store = Arc::new(MemoryStorage::new());
        seed_token(&store, "tok123", 0).await;
        let auth = provider(store)
            .authorize_header(Some("Bearer tok123"))
            .await
            .unwrap();
        assert!(!auth.is_valid);
        assert_eq!(auth.error, Some("access_denied"));
    }
}
