//! Token endpoint wire types.
//!
//! The token endpoint receives `application/x-www-form-urlencoded` bodies.
//! [`TokenRequest::from_form`] performs the protocol-defined presence
//! checks before the grant flows run: `grant_type`, `client_id`, and
//! `client_secret` always; `refresh_token` for the refresh grant;
//! `redirect_uri` and `code` for everything else.

use std::collections::HashMap;

use serde::Serialize;

use crate::AuthResult;
use crate::error::AuthError;

/// A parsed token request, covering both grant flows.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    /// Requested grant type: `authorization_code` or `refresh_token`.
    pub grant_type: String,

    /// Client identifier.
    pub client_id: String,

    /// Client secret.
    pub client_secret: String,

    /// Redirect URI (authorization_code grant).
    pub redirect_uri: Option<String>,

    /// Authorization code (authorization_code grant).
    pub code: Option<String>,

    /// Refresh token (refresh_token grant).
    pub refresh_token: Option<String>,

    /// Requested scope. Empty means "whatever the grant already carries".
    pub scope: String,
}

impl TokenRequest {
    /// Builds an authorization-code exchange request.
    #[must_use]
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "authorization_code".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: Some(redirect_uri.into()),
            code: Some(code.into()),
            refresh_token: None,
            scope: String::new(),
        }
    }

    /// Builds a refresh-token request.
    #[must_use]
    pub fn refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "refresh_token".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            code: None,
            refresh_token: Some(refresh_token.into()),
            scope: String::new(),
        }
    }

    /// Sets the requested scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Parses a token request from a form-encoded body.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if any required parameter is missing or
    /// empty.
    pub fn from_form(body: &str) -> AuthResult<Self> {
        let params: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let required = |name: &str| -> AuthResult<String> {
            params
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    AuthError::invalid_request(format!("Missing required parameter: {name}"))
                })
        };

        let grant_type = required("grant_type")?;
        let client_id = required("client_id")?;
        let client_secret = required("client_secret")?;
        let scope = params.get("scope").cloned().unwrap_or_default();

        let (redirect_uri, code, refresh_token) = if grant_type == "refresh_token" {
            (None, None, Some(required("refresh_token")?))
        } else {
            (Some(required("redirect_uri")?), Some(required("code")?), None)
        };

        Ok(Self {
            grant_type,
            client_id,
            client_secret,
            redirect_uri,
            code,
            refresh_token,
            scope,
        })
    }
}

/// Successful token response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGrant {
    /// The bearer access token.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// The refresh token paired with this access token.
    pub refresh_token: String,
}

impl TokenGrant {
    /// Creates a new grant body.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_in: u64,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_in,
            refresh_token: refresh_token.into(),
        }
    }
}
