//! The authorization state machine.
//!
//! [`AuthorizationProvider`] issues authorization codes, exchanges them for
//! token pairs, rotates refresh tokens, and revokes outstanding tokens in
//! bulk. Storage is injected through the [`ClientStorage`] and
//! [`TokenStorage`] traits; every listed precondition is enforced
//! unconditionally, in order, and a failed validation performs no write.
//!
//! # Single-use guarantees
//!
//! Codes and refresh tokens are consumed through the store's atomic `take`:
//! when two exchanges race on the same credential, at most one observes a
//! value and the loser fails with `invalid_grant`. Writes are forward-only;
//! nothing committed is rolled back on a later failure, and a token is
//! never observable before its own persistence write completes.

use std::sync::Arc;

use crate::AuthResult;
use crate::config::ProviderConfig;
use crate::error::AuthError;
use crate::generate::TokenGenerator;
use crate::oauth::authorize::{self, AuthorizeRedirect, AuthorizeRequest};
use crate::oauth::response::ProviderResponse;
use crate::oauth::token::{TokenGrant, TokenRequest};
use crate::storage::{ClientStorage, TokenStorage};
use crate::types::client::strip_query;
use crate::types::{SessionData, keys};

/// OAuth 2.0 authorization provider.
pub struct AuthorizationProvider {
    clients: Arc<dyn ClientStorage>,
    tokens: Arc<dyn TokenStorage>,
    generator: TokenGenerator,
    config: ProviderConfig,
}

impl AuthorizationProvider {
    /// Creates a provider over the given storage backends.
    ///
    /// The token generator is derived from `config.token_length`; use
    /// [`Self::with_generator`] to replace it.
    #[must_use]
    pub fn new(
        clients: Arc<dyn ClientStorage>,
        tokens: Arc<dyn TokenStorage>,
        config: ProviderConfig,
    ) -> Self {
        let generator = TokenGenerator::new(config.token_length);
        Self {
            clients,
            tokens,
            generator,
            config,
        }
    }

    /// Replaces the token generator.
    #[must_use]
    pub fn with_generator(mut self, generator: TokenGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// The provider configuration.
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Handles an authorization request: validates it, issues a code, and
    /// returns the redirect descriptor.
    ///
    /// Equivalent to [`Self::authorize_as`] with no resource owner; used by
    /// transports that have not authenticated one.
    ///
    /// # Errors
    ///
    /// See [`Self::authorize_as`].
    pub async fn authorize(&self, request: &AuthorizeRequest) -> AuthResult<AuthorizeRedirect> {
        self.authorize_as(request, None).await
    }

    /// Handles an authorization request on behalf of an authenticated
    /// resource owner.
    ///
    /// On success exactly one code is written to the store, TTL-bound to
    /// the configured code lifetime, and the returned descriptor carries
    /// the caller's redirect URI with `code` appended and the request's
    /// non-protocol parameters preserved.
    ///
    /// # Errors
    ///
    /// - `UnsupportedResponseType` unless `response_type` is `code`
    /// - `UnauthorizedClient` if the client is not registered
    /// - `InvalidRequest` if the redirect URI does not match the registered
    ///   one (the candidate's query string is ignored) or cannot be parsed
    /// - `InvalidScope` if a non-empty requested scope differs from the
    ///   registered scope
    /// - `Storage` if the store cannot be reached
    pub async fn authorize_as(
        &self,
        request: &AuthorizeRequest,
        user_id: Option<&str>,
    ) -> AuthResult<AuthorizeRedirect> {
        if request.response_type != "code" {
            return Err(AuthError::unsupported_response_type(&request.response_type));
        }

        let client = self
            .clients
            .find_client(&request.client_id)
            .await?
            .ok_or_else(|| AuthError::unauthorized_client("Unknown client"))?;

        if !client.redirect_uri_matches(&request.redirect_uri) {
            return Err(AuthError::invalid_request(
                "redirect_uri does not match the registered redirect URI",
            ));
        }

        // Empty scope means "use the registered default"; anything else
        // must equal the registration.
        let scope = if request.scope.is_empty() {
            client.scope.clone()
        } else if request.scope == client.scope {
            request.scope.clone()
        } else {
            return Err(AuthError::invalid_scope(
                "requested scope does not match the registered scope",
            ));
        };

        let code = self.generator.generate();

        // Building the redirect first keeps the no-write-on-failure
        // contract: a malformed redirect URI fails before persistence.
        let redirect = AuthorizeRedirect::build(&request.redirect_uri, code, &request.extra)?;

        let mut data = SessionData::new(&client.client_id, scope)
            .with_redirect_uri(strip_query(&request.redirect_uri));
        if let Some(user_id) = user_id {
            data = data.with_user_id(user_id);
        }

        self.tokens
            .put_with_ttl(
                &keys::authorization_code(&client.client_id, &redirect.code),
                &data.to_json()?,
                self.config.code_lifetime_secs(),
            )
            .await?;

        tracing::debug!(client_id = %client.client_id, "authorization code issued");
        Ok(redirect)
    }

    /// Exchanges an authorization code for a fresh access/refresh token
    /// pair.
    ///
    /// Consumption is single-use: the code is taken from the store
    /// atomically, so a replay or a concurrent second exchange fails with
    /// `invalid_grant`.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrantType` unless `grant_type` is `authorization_code`
    /// - `InvalidRequest` if `code` or `redirect_uri` is absent
    /// - `InvalidClient` if the client is unknown or the secret is wrong
    /// - `InvalidGrant` if the code does not resolve for this client, has
    ///   expired, was already consumed, or the recorded redirect URI does
    ///   not match
    /// - `Storage` if the store cannot be reached
    pub async fn exchange(&self, request: &TokenRequest) -> AuthResult<TokenGrant> {
        if request.grant_type != "authorization_code" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }
        let code = request
            .code
            .as_deref()
            .ok_or_else(|| AuthError::invalid_request("Missing required parameter: code"))?;
        let redirect_uri = request.redirect_uri.as_deref().ok_or_else(|| {
            AuthError::invalid_request("Missing required parameter: redirect_uri")
        })?;

        self.authenticate_client(&request.client_id, &request.client_secret)
            .await?;

        // One logical "take": lookup and deletion in a single atomic step.
        let raw = self
            .tokens
            .take(&keys::authorization_code(&request.client_id, code))
            .await?
            .ok_or_else(|| AuthError::invalid_grant("authorization code is invalid or expired"))?;
        let data = SessionData::from_json(&raw)?;

        if data.redirect_uri.as_deref() != Some(strip_query(redirect_uri)) {
            return Err(AuthError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }

        let grant = self.persist_token_set(&data).await?;
        tracing::debug!(client_id = %request.client_id, "authorization code exchanged");
        Ok(grant)
    }

    /// Rotates a refresh token: invalidates the presented token and mints a
    /// new access/refresh pair carrying the same session payload.
    ///
    /// The presented token is taken atomically after validation, so a
    /// concurrent second rotation has exactly one winner and the discarded
    /// token never validates again.
    ///
    /// # Errors
    ///
    /// - `UnsupportedGrantType` unless `grant_type` is `refresh_token`
    /// - `InvalidRequest` if `refresh_token` is absent
    /// - `InvalidClient` if the client is unknown or the secret is wrong
    /// - `InvalidGrant` if the token does not resolve for this client or
    ///   was already rotated or revoked
    /// - `InvalidScope` if a non-empty requested scope differs from the
    ///   scope recorded with the token
    /// - `Storage` if the store cannot be reached
    pub async fn refresh(&self, request: &TokenRequest) -> AuthResult<TokenGrant> {
        if request.grant_type != "refresh_token" {
            return Err(AuthError::unsupported_grant_type(&request.grant_type));
        }
        let token = request.refresh_token.as_deref().ok_or_else(|| {
            AuthError::invalid_request("Missing required parameter: refresh_token")
        })?;

        self.authenticate_client(&request.client_id, &request.client_secret)
            .await?;

        let key = keys::refresh_token(&request.client_id, token);
        let raw = self
            .tokens
            .get(&key)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("refresh token is invalid"))?;
        let data = SessionData::from_json(&raw)?;

        if !request.scope.is_empty() && request.scope != data.scope {
            return Err(AuthError::invalid_scope(
                "requested scope does not match the granted scope",
            ));
        }
        if data.client_id != request.client_id {
            return Err(AuthError::invalid_grant(
                "refresh token was issued to another client",
            ));
        }

        // Validation passed; now consume. The take decides the winner of
        // any concurrent rotation of the same token.
        if self.tokens.take(&key).await?.is_none() {
            return Err(AuthError::invalid_grant("refresh token is invalid"));
        }

        let grant = self.persist_token_set(&data).await?;
        tracing::debug!(client_id = %request.client_id, "refresh token rotated");
        Ok(grant)
    }

    /// Revokes every outstanding access and refresh token issued to a
    /// (client, user) pair, along with the index entry itself.
    ///
    /// # Errors
    ///
    /// Returns a `Storage` error if the store cannot be reached.
    pub async fn revoke_client_user_tokens(
        &self,
        client_id: &str,
        user_id: Option<&str>,
    ) -> AuthResult<()> {
        let index_key = keys::client_user(client_id, user_id);
        let mut doomed = self.tokens.members_of(&index_key).await?;
        let revoked = doomed.len();
        doomed.push(index_key);
        self.tokens.delete_many(&doomed).await?;
        tracing::debug!(client_id, revoked, "client-user tokens revoked");
        Ok(())
    }

    /// Runs the authorization flow from a raw request URI, producing the
    /// wire response.
    ///
    /// Required-parameter failures and flow failures are delivered as
    /// redirect errors when the caller supplied a redirect target, and as
    /// a JSON `invalid_request` when it did not.
    pub async fn authorize_from_uri(&self, uri: &str) -> ProviderResponse {
        let pairs = match authorize::query_pairs(uri) {
            Ok(pairs) => pairs,
            Err(err) => return ProviderResponse::json_error(&err),
        };
        let redirect_target = pairs
            .iter()
            .find(|(name, value)| name == "redirect_uri" && !value.is_empty())
            .map(|(_, value)| value.clone());

        let request = match AuthorizeRequest::from_pairs(pairs) {
            Ok(request) => request,
            Err(err) => {
                return match redirect_target.as_deref() {
                    Some(target) => ProviderResponse::redirect_error(target, &err),
                    None => ProviderResponse::json_error(&err),
                };
            }
        };

        match self.authorize(&request).await {
            Ok(redirect) => ProviderResponse::redirect(redirect.location),
            Err(err) => {
                if err.is_server_error() {
                    tracing::error!(error = %err, "authorization request failed");
                } else {
                    tracing::debug!(error = %err, "authorization request rejected");
                }
                ProviderResponse::redirect_error(&request.redirect_uri, &err)
            }
        }
    }

    /// Runs the matching token flow from a form-encoded body, producing
    /// the wire response. Token-endpoint failures are always JSON.
    pub async fn token_from_form(&self, body: &str) -> ProviderResponse {
        let request = match TokenRequest::from_form(body) {
            Ok(request) => request,
            Err(err) => return ProviderResponse::json_error(&err),
        };

        let result = if request.grant_type == "refresh_token" {
            self.refresh(&request).await
        } else {
            self.exchange(&request).await
        };

        match result {
            Ok(grant) => ProviderResponse::json(200, &grant),
            Err(err) => {
                if err.is_server_error() {
                    tracing::error!(error = %err, "token request failed");
                } else {
                    tracing::debug!(error = %err, "token request rejected");
                }
                ProviderResponse::json_error(&err)
            }
        }
    }

    /// Resolves the client and checks its secret in constant time.
    async fn authenticate_client(&self, client_id: &str, client_secret: &str) -> AuthResult<()> {
        let client = self
            .clients
            .find_client(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("Unknown client"))?;
        if !client.secret_matches(client_secret) {
            return Err(AuthError::invalid_client("client secret does not match"));
        }
        Ok(())
    }

    /// Mints and persists an access/refresh token pair for the payload,
    /// records both under the client-user index, and returns the grant.
    ///
    /// Write order matters: each token's persistence write completes before
    /// the grant that names it is returned, and the index update comes
    /// last. There is no multi-key atomicity; the narrow window where a
    /// token exists but is not yet indexed only delays bulk revocation,
    /// never token validity.
    async fn persist_token_set(&self, data: &SessionData) -> AuthResult<TokenGrant> {
        let access_token = self.generator.generate();
        let refresh_token = self.generator.generate();
        let payload = data.to_json()?;

        let access_key = keys::access_token(&access_token);
        let refresh_key = keys::refresh_token(&data.client_id, &refresh_token);
        let expires_in = self.config.token_lifetime_secs();

        self.tokens
            .put_with_ttl(&access_key, &payload, expires_in)
            .await?;
        self.tokens.put(&refresh_key, &payload).await?;

        let index_key = keys::client_user(&data.client_id, data.user_id.as_deref());
        self.tokens
            .add_to_set(&index_key, &[access_key, refresh_key])
            .await?;

        Ok(TokenGrant::new(
            access_token,
            self.config.token_type.clone(),
            expires_in,
            refresh_token,
        ))
    }
}
