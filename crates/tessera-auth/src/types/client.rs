//! OAuth 2.0 client (application) records.
//!
//! Clients are registered and mutated outside the engine; the engine only
//! reads them through [`crate::storage::ClientStorage`].

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// A registered client application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Unique client identifier used in OAuth flows. Immutable once
    /// registered.
    pub client_id: String,

    /// Client secret presented on the token endpoint.
    pub client_secret: String,

    /// The registered redirect URI, stored without a query string.
    pub redirect_uri: String,

    /// The registered scope granted to this client.
    #[serde(default)]
    pub scope: String,
}

impl Client {
    /// Creates a new client record.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: scope.into(),
        }
    }

    /// Checks a caller-supplied redirect URI against the registered one.
    ///
    /// Only the path/authority component of the candidate is compared; any
    /// query string it carries is ignored, since clients routinely append
    /// per-request parameters to their callback URL.
    #[must_use]
    pub fn redirect_uri_matches(&self, candidate: &str) -> bool {
        strip_query(candidate) == self.redirect_uri
    }

    /// Compares a presented secret with the registered one in constant time.
    #[must_use]
    pub fn secret_matches(&self, candidate: &str) -> bool {
        self.client_secret
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }
}

/// Returns the URI with any query portion removed.
pub(crate) fn strip_query(uri: &str) -> &str {
    match uri.split_once('?') {
        Some((base, _)) => base,
        None => uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new("app123", "s3cr3t", "https://client.example/cb", "read")
    }

    #[test]
    fn test_redirect_uri_exact_match() {
        assert!(client().redirect_uri_matches("https://client.example/cb"));
    }

    #[test]
    fn test_redirect_uri_ignores_query() {
        assert!(client().redirect_uri_matches("https://client.example/cb?state=1"));
        assert!(client().redirect_uri_matches("https://client.example/cb?a=1&b=2"));
    }

    #[test]
    fn test_redirect_uri_mismatch() {
        assert!(!client().redirect_uri_matches("https://client.example/other"));
        assert!(!client().redirect_uri_matches("https://evil.example/cb"));
    }

    #[test]
    fn test_secret_matches() {
        assert!(client().secret_matches("s3cr3t"));
        assert!(!client().secret_matches("s3cr3t "));
        assert!(!client().secret_matches("wrong"));
        assert!(!client().secret_matches(""));
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&client()).unwrap();
        let back: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(back, client());
    }
}
