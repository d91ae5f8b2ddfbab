use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use checkout_core::{Address, CheckoutState, Order, OrderId, ValidationErrors};
use checkout_order::AddressingRequest;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::AppError, middleware::ApiClaims, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SelectShippingRequest {
    #[serde(default)]
    pub shipping_method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectPaymentRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteCheckoutRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSummaryResponse {
    pub id: OrderId,
    pub checkout_state: CheckoutState,
    pub customer: Option<CustomerResponse>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub uses_separate_billing_address: bool,
    pub shipping_method: Option<String>,
    pub payment_method: Option<String>,
    pub currency_code: String,
    pub locale_code: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub checkout_completed_at: Option<DateTime<Utc>>,
}

impl From<Order> for CheckoutSummaryResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            checkout_state: order.checkout_state,
            customer: order.customer.map(|c| CustomerResponse {
                id: c.id,
                email: c.email.into(),
            }),
            shipping_address: order.shipping_address,
            billing_address: order.billing_address,
            uses_separate_billing_address: order.uses_separate_billing_address,
            shipping_method: order.shipping_method,
            payment_method: order.payment_method,
            currency_code: order.currency_code,
            locale_code: order.locale_code,
            notes: order.notes,
            created_at: order.created_at,
            updated_at: order.updated_at,
            checkout_completed_at: order.checkout_completed_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/checkouts/{order_id}", get(get_checkout_summary))
        .route("/api/v1/checkouts/addressing/{order_id}", put(address_order))
        .route("/api/v1/checkouts/select-shipping/{order_id}", put(select_shipping))
        .route("/api/v1/checkouts/select-payment/{order_id}", put(select_payment))
        .route("/api/v1/checkouts/complete/{order_id}", put(complete_checkout))
        .route("/api/v1/checkouts/cancel/{order_id}", put(cancel_checkout))
}

/// Parses a JSON body, treating an empty one as `{}`.
///
/// Bodies are read as raw bytes so that handlers can check the order exists
/// before complaining about the payload.
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ValidationErrors> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ValidationErrors::single("body", format!("Malformed JSON body: {}", e)))
}

// ============================================================================
// Handlers
// ============================================================================

/// Order id from the route, rejected as a validation error when it is not an integer.
pub type OrderPath = WithRejection<Path<OrderId>, AppError>;

/// GET /api/v1/checkouts/{order_id}
async fn get_checkout_summary(
    State(state): State<AppState>,
    WithRejection(Path(order_id), _): OrderPath,
) -> Result<Json<CheckoutSummaryResponse>, AppError> {
    let order = state.checkout.get_order(order_id).await?;
    Ok(Json(order.into()))
}

/// PUT /api/v1/checkouts/addressing/{order_id}
/// Assign customer email, shipping and billing address
async fn address_order(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    WithRejection(Path(order_id), _): OrderPath,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let order = state.checkout.get_order(order_id).await?;
    let req: AddressingRequest = parse_body(&body)?;

    state.checkout.address_order(order, &req).await?;
    tracing::info!(client = %claims.sub, "Order {} addressed via API", order_id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/checkouts/select-shipping/{order_id}
async fn select_shipping(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    WithRejection(Path(order_id), _): OrderPath,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.checkout.get_order(order_id).await?;
    let req: SelectShippingRequest = parse_body(&body)?;

    state
        .checkout
        .select_shipping(order_id, req.shipping_method.as_deref())
        .await?;
    tracing::info!(client = %claims.sub, "Order {} shipping selected via API", order_id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/checkouts/select-payment/{order_id}
async fn select_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    WithRejection(Path(order_id), _): OrderPath,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.checkout.get_order(order_id).await?;
    let req: SelectPaymentRequest = parse_body(&body)?;

    state
        .checkout
        .select_payment(order_id, req.payment_method.as_deref())
        .await?;
    tracing::info!(client = %claims.sub, "Order {} payment selected via API", order_id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/checkouts/complete/{order_id}
async fn complete_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    WithRejection(Path(order_id), _): OrderPath,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    state.checkout.get_order(order_id).await?;
    let req: CompleteCheckoutRequest = parse_body(&body)?;

    state.checkout.complete(order_id, req.notes.as_deref()).await?;
    tracing::info!(client = %claims.sub, "Order {} completed via API", order_id);
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/checkouts/cancel/{order_id}
async fn cancel_checkout(
    State(state): State<AppState>,
    Extension(claims): Extension<ApiClaims>,
    WithRejection(Path(order_id), _): OrderPath,
) -> Result<StatusCode, AppError> {
    state.checkout.cancel(order_id).await?;
    tracing::info!(client = %claims.sub, "Order {} cancelled via API", order_id);
    Ok(StatusCode::NO_CONTENT)
}
