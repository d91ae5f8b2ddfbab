use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::WithRejection;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::auth::ApiClaims, state::{AppState, AuthConfig}};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/auth/token", post(issue_client_token))
}

/// Signs a token for `subject` with `role`, valid for the configured lifetime.
pub fn issue_token(auth: &AuthConfig, subject: &str, role: &str) -> Result<String, AppError> {
    let exp = i64::try_from(auth.expiration)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .and_then(|expires_at| usize::try_from(expires_at.timestamp()).ok())
        .ok_or_else(|| {
            AppError::InternalServerError(format!("Token lifetime of {}s is out of range", auth.expiration))
        })?;

    let claims = ApiClaims {
        sub: subject.to_owned(),
        role: role.to_owned(),
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

async fn issue_client_token(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<TokenRequest>, AppError>,
) -> Result<Json<TokenResponse>, AppError> {
    let client = state
        .auth
        .clients
        .iter()
        .find(|c| c.client_id == req.client_id && c.client_secret == req.client_secret)
        .ok_or_else(|| {
            tracing::warn!("Token request with unknown credentials for client {}", req.client_id);
            AppError::AuthenticationError("Invalid client credentials".to_string())
        })?;

    let token = issue_token(&state.auth, &client.client_id, &client.role)?;
    tracing::info!("Issued token for client {}", client.client_id);

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.expiration,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(expiration: u64) -> AuthConfig {
        AuthConfig {
            secret: "secret".to_string(),
            expiration,
            clients: Vec::new(),
        }
    }

    #[test]
    fn test_issue_token_signs_configured_lifetime() {
        assert!(issue_token(&auth(3600), "client", "API").is_ok());
    }

    #[test]
    fn test_issue_token_rejects_out_of_range_lifetime() {
        assert!(matches!(
            issue_token(&auth(u64::MAX), "client", "API"),
            Err(AppError::InternalServerError(_))
        ));
        assert!(matches!(
            issue_token(&auth(i64::MAX as u64), "client", "API"),
            Err(AppError::InternalServerError(_))
        ));
    }
}
