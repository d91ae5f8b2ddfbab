use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Roles allowed to drive the checkout API.
pub const CHECKOUT_ROLES: [&str; 2] = ["ADMIN", "API"];

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

// ============================================================================
// API Client Authentication Middleware
// ============================================================================

pub async fn api_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract bearer token
    let Authorization(bearer) = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::AuthenticationError("Authentication required".to_string()))?;

    // 2. Decode and validate JWT
    let token_data = decode::<ApiClaims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::AuthenticationError("Invalid or expired token".to_string())
    })?;

    // 3. Check role
    if !CHECKOUT_ROLES.contains(&token_data.claims.role.as_str()) {
        return Err(AppError::AuthorizationError(format!(
            "Role {} may not access checkouts",
            token_data.claims.role
        )));
    }

    // 4. Inject claims into request extensions
    req.extensions_mut().insert(token_data.claims);

    Ok(next.run(req).await)
}
