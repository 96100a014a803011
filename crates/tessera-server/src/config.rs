//! Server configuration.
//!
//! Loaded from an optional TOML file plus `TESSERA_`-prefixed environment
//! overrides (`TESSERA_LISTEN`, `TESSERA_REDIS_URL`, ...). Client seed
//! registrations come from the file only:
//!
//! ```toml
//! listen = "127.0.0.1:9999"
//! redis_url = "redis://127.0.0.1/"
//!
//! [provider]
//! token_length = 40
//! token_lifetime_secs = 3600
//! code_lifetime_secs = 60
//!
//! [[clients]]
//! client_id = "app123"
//! client_secret = "s3cr3t"
//! redirect_uri = "https://client.example/cb"
//! scope = "read"
//! ```

use serde::Deserialize;
use tessera_auth::{Client, ProviderConfig};
use time::Duration;

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    pub listen: String,

    /// Redis connection URL.
    pub redis_url: String,

    /// Protocol-engine settings.
    pub provider: ProviderSettings,

    /// Client registrations seeded into the store at startup.
    pub clients: Vec<Client>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:9999".to_string(),
            redis_url: "redis://127.0.0.1/".to_string(),
            provider: ProviderSettings::default(),
            clients: Vec::new(),
        }
    }
}

/// Settings forwarded to [`ProviderConfig`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Length of generated codes and tokens.
    pub token_length: usize,

    /// Access token lifetime in seconds.
    pub token_lifetime_secs: i64,

    /// Authorization code lifetime in seconds.
    pub code_lifetime_secs: i64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            token_length: 40,
            token_lifetime_secs: 3600,
            code_lifetime_secs: 60,
        }
    }
}

impl ProviderSettings {
    /// Converts into the engine's configuration type.
    #[must_use]
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig::default()
            .with_token_length(self.token_length)
            .with_token_lifetime(Duration::seconds(self.token_lifetime_secs))
            .with_code_lifetime(Duration::seconds(self.code_lifetime_secs))
    }
}

/// Loads configuration from the given TOML file (required when named) and
/// the environment.
///
/// # Errors
///
/// Returns an error if the file cannot be read or a value fails to parse.
pub fn load_config(path: Option<&str>) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(path.unwrap_or("tessera")).required(path.is_some()))
        .add_source(
            config::Environment::with_prefix("TESSERA")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen, "127.0.0.1:9999");
        assert!(cfg.clients.is_empty());

        let provider = cfg.provider.to_provider_config();
        assert_eq!(provider.token_length, 40);
        assert_eq!(provider.token_lifetime_secs(), 3600);
        assert_eq!(provider.code_lifetime_secs(), 60);
    }

    #[test]
    fn test_toml_deserialization() {
        let cfg: ServerConfig = toml_str(
            r#"
            listen = "0.0.0.0:8080"

            [provider]
            token_lifetime_secs = 600

            [[clients]]
            client_id = "app123"
            client_secret = "s3cr3t"
            redirect_uri = "https://client.example/cb"
            scope = "read"
            "#,
        );
        assert_eq!(cfg.listen, "0.0.0.0:8080");
        assert_eq!(cfg.provider.token_lifetime_secs, 600);
        assert_eq!(cfg.provider.code_lifetime_secs, 60);
        assert_eq!(cfg.clients.len(), 1);
        assert_eq!(cfg.clients[0].client_id, "app123");
    }

    fn toml_str(raw: &str) -> ServerConfig {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
