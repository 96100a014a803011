//! Session payloads persisted with codes and tokens.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::error::AuthError;

/// The data associated with an authorization code and carried forward into
/// the access/refresh tokens minted from it.
///
/// Serialized as JSON at the storage boundary. Anything beyond the known
/// fields survives a round trip through `extra`, so application layers can
/// attach session details without the engine knowing about them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// The client the grant was issued to.
    pub client_id: String,

    /// The resource owner, when the application layer established one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// The granted scope.
    #[serde(default)]
    pub scope: String,

    /// The redirect URI the code was issued against, recorded so the
    /// exchange can verify the association.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Application-defined fields preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SessionData {
    /// Creates a payload for a grant to `client_id` with the given scope.
    #[must_use]
    pub fn new(client_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            scope: scope.into(),
            ..Self::default()
        }
    }

    /// Sets the resource owner.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Records the redirect URI the grant was issued against.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Serializes the payload for storage.
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if serialization fails; a payload the
    /// engine built itself always serializes.
    pub fn to_json(&self) -> AuthResult<String> {
        serde_json::to_string(self)
            .map_err(|e| AuthError::storage(format!("failed to encode session payload: {e}")))
    }

    /// Deserializes a payload previously written by [`Self::to_json`].
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the stored value is not a valid payload.
    pub fn from_json(raw: &str) -> AuthResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AuthError::storage(format!("malformed session payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let data = SessionData::new("app123", "read")
            .with_user_id("user-9")
            .with_redirect_uri("https://client.example/cb");
        let raw = data.to_json().unwrap();
        assert_eq!(SessionData::from_json(&raw).unwrap(), data);
    }

    #[test]
    fn test_extra_fields_survive() {
        let raw = r#"{"client_id":"app123","scope":"read","device":"d-42"}"#;
        let data = SessionData::from_json(raw).unwrap();
        assert_eq!(data.extra.get("device").unwrap(), "d-42");
        let reencoded = data.to_json().unwrap();
        assert!(reencoded.contains(r#""device":"d-42""#));
    }

    #[test]
    fn test_malformed_payload() {
        let err = SessionData::from_json("not json").unwrap_err();
        assert_eq!(err.oauth_error_code(), "server_error");
    }
}
