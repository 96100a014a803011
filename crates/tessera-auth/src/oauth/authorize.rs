//! Authorization endpoint wire types.
//!
//! The authorization endpoint receives its parameters as a query string.
//! [`AuthorizeRequest::from_uri`] performs the protocol-defined presence
//! checks (`response_type`, `client_id`, `redirect_uri`) before the flow
//! proper runs; everything else the caller sent is retained and echoed on
//! the success redirect.

use url::Url;

use crate::AuthResult;
use crate::error::AuthError;

/// Query parameters the success redirect never echoes back.
const PROTOCOL_PARAMS: &[&str] = &["response_type", "client_id", "redirect_uri"];

/// A parsed authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    /// Requested response type. Must be exactly "code".
    pub response_type: String,

    /// Client identifier.
    pub client_id: String,

    /// Caller-supplied redirect URI.
    pub redirect_uri: String,

    /// Requested scope. Empty means "use the registered default".
    pub scope: String,

    /// Non-protocol parameters, in request order, echoed on the success
    /// redirect. Includes `scope` when the caller sent one.
    pub extra: Vec<(String, String)>,
}

impl AuthorizeRequest {
    /// Creates a request from explicit parts, with no extra parameters.
    #[must_use]
    pub fn new(
        response_type: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            response_type: response_type.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scope: scope.into(),
            extra: Vec::new(),
        }
    }

    /// Parses an authorization request from a request URI.
    ///
    /// The domain and path are ignored; only the query string is read.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if the URI cannot be parsed or any of
    /// `response_type`, `client_id`, `redirect_uri` is missing or empty.
    pub fn from_uri(uri: &str) -> AuthResult<Self> {
        Self::from_pairs(query_pairs(uri)?)
    }

    /// Builds an authorization request from pre-parsed query pairs.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if any of `response_type`, `client_id`,
    /// `redirect_uri` is missing or empty.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> AuthResult<Self> {
        let required = |name: &str| -> AuthResult<String> {
            pairs
                .iter()
                .find(|(k, v)| k == name && !v.is_empty())
                .map(|(_, v)| v.clone())
                .ok_or_else(|| {
                    AuthError::invalid_request(format!("Missing required parameter: {name}"))
                })
        };

        let response_type = required("response_type")?;
        let client_id = required("client_id")?;
        let redirect_uri = required("redirect_uri")?;
        let scope = pairs
            .iter()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        let extra = pairs
            .into_iter()
            .filter(|(k, _)| !PROTOCOL_PARAMS.contains(&k.as_str()))
            .collect();

        Ok(Self {
            response_type,
            client_id,
            redirect_uri,
            scope,
            extra,
        })
    }
}

/// The success result of an authorization request: where to send the
/// user-agent, and the code that was issued.
#[derive(Debug, Clone)]
pub struct AuthorizeRedirect {
    /// The full redirect target: the caller's redirect URI with `code`
    /// appended and non-protocol request parameters preserved.
    pub location: String,

    /// The issued authorization code.
    pub code: String,
}

impl AuthorizeRedirect {
    /// Builds the redirect for a freshly issued code.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` if the redirect URI cannot be parsed.
    pub fn build(
        redirect_uri: &str,
        code: impl Into<String>,
        extra: &[(String, String)],
    ) -> AuthResult<Self> {
        let code = code.into();
        let mut url = parse_redirect_uri(redirect_uri)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("code", &code);
            for (name, value) in extra {
                query.append_pair(name, value);
            }
        }
        Ok(Self {
            location: url.to_string(),
            code,
        })
    }
}

/// Parses a redirect URI, which must be absolute.
pub(crate) fn parse_redirect_uri(redirect_uri: &str) -> AuthResult<Url> {
    Url::parse(redirect_uri)
        .map_err(|_| AuthError::invalid_request("Malformed redirect_uri".to_string()))
}

/// Extracts the query pairs of a request URI, which may be absolute or a
/// bare path-and-query as transports usually hand it over.
pub(crate) fn query_pairs(uri: &str) -> AuthResult<Vec<(String, String)>> {
    let url = match Url::parse(uri) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost")
            .and_then(|base| base.join(uri))
            .map_err(|_| AuthError::invalid_request("Malformed request URI".to_string()))?,
        Err(_) => return Err(AuthError::invalid_request("Malformed request URI".to_string())),
    };
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
