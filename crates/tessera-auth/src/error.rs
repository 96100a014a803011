//! Protocol-engine error types.
//!
//! This module defines the error taxonomy produced by the authorization and
//! resource providers. Every variant corresponds to a specific validation
//! step in the flows; storage failures are carried separately and surface on
//! the wire as `server_error`.

/// Errors produced by the OAuth 2.0 protocol flows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The authorization endpoint was asked for a response type other than
    /// `code`.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// The token endpoint was asked for a grant type other than
    /// `authorization_code` or `refresh_token`.
    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType {
        /// The unsupported grant type.
        grant_type: String,
    },

    /// The client is not registered and may not request an authorization code.
    #[error("Unauthorized client: {message}")]
    UnauthorizedClient {
        /// Description of why the client is unauthorized.
        message: String,
    },

    /// The requested scope does not match what the client registered.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The request is missing a required parameter or is otherwise malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// Client authentication failed (unknown client or wrong secret).
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The authorization code or refresh token is invalid, expired, consumed,
    /// or was issued to another client.
    #[error("Invalid grant: {message}")]
    InvalidGrant {
        /// Description of why the grant is invalid.
        message: String,
    },

    /// The bearer credential did not authorize access to the resource.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// An unexpected failure from the persistence adapter.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `UnsupportedGrantType` error.
    #[must_use]
    pub fn unsupported_grant_type(grant_type: impl Into<String>) -> Self {
        Self::UnsupportedGrantType {
            grant_type: grant_type.into(),
        }
    }

    /// Creates a new `UnauthorizedClient` error.
    #[must_use]
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::UnauthorizedClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidGrant` error.
    #[must_use]
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::InvalidGrant {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation failure attributable to the
    /// caller (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage { .. })
    }

    /// Returns `true` if this is an unexpected server-side failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }

    /// Returns the OAuth 2.0 error code for this error.
    ///
    /// This is the `error` value carried in redirect and JSON error
    /// responses.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::UnsupportedGrantType { .. } => "unsupported_grant_type",
            Self::UnauthorizedClient { .. } => "unauthorized_client",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidGrant { .. } => "invalid_grant",
            Self::AccessDenied { .. } => "access_denied",
            Self::Storage { .. } => "server_error",
        }
    }

    /// Returns the HTTP status code for a JSON rendering of this error.
    ///
    /// Failed client authentication is 401; every other failure, including
    /// `server_error`, stays in the 400 class the token endpoint emits.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient { .. } | Self::AccessDenied { .. } => 401,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_client("wrong secret");
        assert_eq!(err.to_string(), "Invalid client: wrong secret");

        let err = AuthError::invalid_grant("code already consumed");
        assert_eq!(err.to_string(), "Invalid grant: code already consumed");

        let err = AuthError::unsupported_response_type("token");
        assert_eq!(err.to_string(), "Unsupported response type: token");
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::invalid_grant("x").is_client_error());
        assert!(!AuthError::invalid_grant("x").is_server_error());

        assert!(AuthError::storage("connection refused").is_server_error());
        assert!(!AuthError::storage("connection refused").is_client_error());
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::unsupported_response_type("token").oauth_error_code(),
            "unsupported_response_type"
        );
        assert_eq!(
            AuthError::unsupported_grant_type("password").oauth_error_code(),
            "unsupported_grant_type"
        );
        assert_eq!(
            AuthError::unauthorized_client("x").oauth_error_code(),
            "unauthorized_client"
        );
        assert_eq!(AuthError::invalid_scope("x").oauth_error_code(), "invalid_scope");
        assert_eq!(
            AuthError::invalid_request("x").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(AuthError::invalid_client("x").oauth_error_code(), "invalid_client");
        assert_eq!(AuthError::invalid_grant("x").oauth_error_code(), "invalid_grant");
        assert_eq!(AuthError::access_denied("x").oauth_error_code(), "access_denied");
        assert_eq!(AuthError::storage("x").oauth_error_code(), "server_error");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(AuthError::invalid_client("x").http_status(), 401);
        assert_eq!(AuthError::access_denied("x").http_status(), 401);
        assert_eq!(AuthError::invalid_grant("x").http_status(), 400);
        assert_eq!(AuthError::storage("x").http_status(), 400);
    }
}
