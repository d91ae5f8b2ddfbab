pub mod auth;

pub use auth::{api_auth_middleware, ApiClaims};
