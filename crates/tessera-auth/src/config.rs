//! Provider configuration.

use time::Duration;

/// Configuration for the authorization provider.
///
/// All values carry defaults matching the classic provider behavior:
/// 40-character tokens, one-hour access tokens, one-minute authorization
/// codes.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Length of generated authorization codes and tokens.
    /// Default: 40 characters.
    pub token_length: usize,

    /// Access token type advertised in token responses.
    /// Default: "Bearer".
    pub token_type: String,

    /// Access token lifetime.
    /// Default: 1 hour.
    pub token_lifetime: Duration,

    /// Authorization code lifetime.
    /// Default: 60 seconds.
    pub code_lifetime: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token_length: 40,
            token_type: "Bearer".to_string(),
            token_lifetime: Duration::hours(1),
            code_lifetime: Duration::seconds(60),
        }
    }
}

impl ProviderConfig {
    /// Creates a new configuration with custom token length.
    #[must_use]
    pub fn with_token_length(mut self, length: usize) -> Self {
        self.token_length = length;
        self
    }

    /// Creates a new configuration with custom access token lifetime.
    #[must_use]
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Creates a new configuration with custom authorization code lifetime.
    #[must_use]
    pub fn with_code_lifetime(mut self, lifetime: Duration) -> Self {
        self.code_lifetime = lifetime;
        self
    }

    /// Access token lifetime in whole seconds, as written to the store and
    /// reported in `expires_in`.
    #[must_use]
    pub fn token_lifetime_secs(&self) -> u64 {
        self.token_lifetime.whole_seconds().max(0) as u64
    }

    /// Authorization code lifetime in whole seconds.
    #[must_use]
    pub fn code_lifetime_secs(&self) -> u64 {
        self.code_lifetime.whole_seconds().max(0) as u64
    }
}
