use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use serde::Deserialize;

use crate::checkouts::{parse_body, CheckoutSummaryResponse};
use crate::{error::AppError, middleware::ApiClaims, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct CreateCartRequest {
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub locale_code: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/v1/carts", post(create_cart))
}

/// POST /api/v1/carts
/// Open an empty cart
async fn create_cart(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    body: Bytes,
) -> Result<(StatusCode, Json<CheckoutSummaryResponse>), AppError> {
    let req: CreateCartRequest = parse_body(&body)?;

    let order = state
        .checkout
        .create_cart(req.currency_code.as_deref(), req.locale_code.as_deref())
        .await?;
    tracing::info!(client = %claims.sub, "Cart {} opened via API", order.id);

    Ok((StatusCode::CREATED, Json(order.into())))
}
