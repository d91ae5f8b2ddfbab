use std::sync::Arc;

use checkout_order::CheckoutService;
use checkout_store::app_config::ApiClientConfig;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub clients: Vec<ApiClientConfig>,
}

impl From<&checkout_store::app_config::AuthConfig> for AuthConfig {
    fn from(config: &checkout_store::app_config::AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiration: config.jwt_expiration_seconds,
            clients: config.clients.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub checkout: Arc<CheckoutService>,
    pub auth: AuthConfig,
}
