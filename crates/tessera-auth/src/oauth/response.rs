//! Transport-neutral response construction.
//!
//! The engine produces two wire shapes: a redirect (success redirects and
//! authorization-endpoint errors) and a JSON body (token-endpoint traffic
//! and any error without a trustworthy redirect target). Which shape an
//! error takes is fixed by the endpoint that produced it, never by the
//! error kind alone.

use serde::Serialize;

use crate::error::AuthError;
use crate::oauth::authorize::parse_redirect_uri;

/// A response descriptor the transport layer renders as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response headers.
    pub headers: Vec<(&'static str, String)>,

    /// Response body, empty for redirects.
    pub body: String,
}

impl ProviderResponse {
    /// A 302 redirect to `location`.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            headers: vec![("Location", location.into())],
            body: String::new(),
        }
    }

    /// A JSON body with the cache-disabling headers every token-endpoint
    /// response carries.
    #[must_use]
    pub fn json(status: u16, body: &impl Serialize) -> Self {
        // Serializing engine-built bodies cannot fail; fall back to an
        // empty object rather than panicking if it somehow does.
        let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
        Self {
            status,
            headers: vec![
                ("Content-Type", "application/json;charset=UTF-8".to_string()),
                ("Cache-Control", "no-store".to_string()),
                ("Pragma", "no-cache".to_string()),
            ],
            body,
        }
    }

    /// A JSON error body: `{"error": "<kind>"}`.
    #[must_use]
    pub fn json_error(err: &AuthError) -> Self {
        Self::json(err.http_status(), &ErrorBody::new(err))
    }

    /// A redirect error: `error=<kind>` appended to the client's redirect
    /// URI. Protocol parameters are never echoed.
    ///
    /// Falls back to a JSON `invalid_request` when the redirect URI cannot
    /// be parsed, since an untrustworthy target must not receive the error.
    #[must_use]
    pub fn redirect_error(redirect_uri: &str, err: &AuthError) -> Self {
        match parse_redirect_uri(redirect_uri) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("error", err.oauth_error_code());
                Self::redirect(url.to_string())
            }
            Err(_) => Self::json_error(&AuthError::invalid_request("Malformed redirect_uri")),
        }
    }

    /// The `Location` header value, if this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| *name == "Location")
            .map(|(_, value)| value.as_str())
    }
}

/// JSON error body shape.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl ErrorBody {
    fn new(err: &AuthError) -> Self {
        Self {
            error: err.oauth_error_code(),
        }
    }
}
