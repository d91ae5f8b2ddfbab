use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub fixtures: FixturesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Without a `url` the API runs on the in-memory store.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    #[serde(default)]
    pub clients: Vec<ApiClientConfig>,
}

/// Credentials exchanged for a bearer token at `/api/v1/auth/token`.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiClientConfig {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String { "API".to_string() }

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            default_locale: default_locale(),
        }
    }
}

fn default_currency() -> String { "EUR".to_string() }
fn default_locale() -> String { "en_US".to_string() }

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FixturesConfig {
    pub path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `CHECKOUT__DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("CHECKOUT").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "secret"
            jwt_expiration_seconds = 3600
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert!(config.database.url.is_none());
        assert_eq!(config.database.max_connections, 5);
        assert!(config.auth.clients.is_empty());
        assert_eq!(config.checkout.default_currency, "EUR");
        assert_eq!(config.checkout.default_locale, "en_US");
        assert!(config.fixtures.path.is_none());
    }

    #[test]
    fn test_api_clients() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [auth]
            jwt_secret = "secret"
            jwt_expiration_seconds = 60

            [[auth.clients]]
            client_id = "admin"
            client_secret = "s3cret"
            role = "ADMIN"

            [[auth.clients]]
            client_id = "storefront"
            client_secret = "other"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.clients.len(), 2);
        assert_eq!(config.auth.clients[0].role, "ADMIN");
        assert_eq!(config.auth.clients[1].role, "API");
    }

    #[test]
    fn test_missing_auth_section_fails() {
        assert!(Config::from_toml("[server]\nport = 1").is_err());
    }
}
