#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use checkout_api::{app, auth::issue_token, AppState, AuthConfig};
use checkout_order::{CartDefaults, CheckoutService, Repositories};
use checkout_store::app_config::ApiClientConfig;
use checkout_store::{Fixtures, LoadedFixtures, MemoryStore};
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

pub const CHECKOUT_FIXTURES: &str = include_str!("../fixtures/checkout.yml");

pub struct TestApp {
    pub router: Router,
    pub fixtures: LoadedFixtures,
    pub auth: AuthConfig,
    pub token: String,
}

impl TestApp {
    pub fn order_id(&self, name: &str) -> i64 {
        self.fixtures
            .order_id(name)
            .unwrap_or_else(|| panic!("no fixture order named {}", name))
    }

    pub fn addressing_url(&self, name: &str) -> String {
        format!("/api/v1/checkouts/addressing/{}", self.order_id(name))
    }

    pub fn summary_url(&self, name: &str) -> String {
        format!("/api/v1/checkouts/{}", self.order_id(name))
    }

    pub async fn request(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Authorized PUT with an optional JSON body.
    pub async fn put(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(json_request("PUT", uri, Some(&self.token), body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(json_request("GET", uri, Some(&self.token), None)).await
    }

    pub async fn post(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(json_request("POST", uri, Some(&self.token), body)).await
    }

    pub async fn select_shipping(&self, name: &str, method: &str) {
        let (status, body) = self
            .put(
                &format!("/api/v1/checkouts/select-shipping/{}", self.order_id(name)),
                Some(serde_json::json!({ "shipping_method": method })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{}", body);
    }

    pub async fn select_payment(&self, name: &str, method: &str) {
        let (status, body) = self
            .put(
                &format!("/api/v1/checkouts/select-payment/{}", self.order_id(name)),
                Some(serde_json::json!({ "payment_method": method })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT, "{}", body);
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn test_auth() -> AuthConfig {
    AuthConfig {
        secret: "test-secret".to_string(),
        expiration: 3600,
        clients: vec![ApiClientConfig {
            client_id: "api_administrator".to_string(),
            client_secret: "topsecret".to_string(),
            role: "ADMIN".to_string(),
        }],
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(CHECKOUT_FIXTURES).await
}

pub async fn spawn_app_with(fixtures: &str) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let fixtures = Fixtures::from_yaml(fixtures)
        .unwrap()
        .load_into(&store)
        .await
        .unwrap();

    let (tx, _) = broadcast::channel(64);
    let checkout = CheckoutService::new(Repositories::from_store(store), tx, CartDefaults::default());

    let auth = test_auth();
    let token = issue_token(&auth, "api_administrator", "ADMIN").unwrap();

    let router = app(AppState {
        checkout: Arc::new(checkout),
        auth: auth.clone(),
    });

    TestApp { router, fixtures, auth, token }
}

pub fn bosch() -> Value {
    serde_json::json!({
        "first_name": "Hieronim",
        "last_name": "Bosch",
        "street": "Surrealism St.",
        "country_code": "NL",
        "city": "’s-Hertogenbosch",
        "postcode": "99-999"
    })
}

pub fn van_gogh() -> Value {
    serde_json::json!({
        "first_name": "Vincent",
        "last_name": "van Gogh",
        "street": "Post-Impressionism St.",
        "country_code": "NL",
        "city": "Groot Zundert",
        "postcode": "88-888"
    })
}

pub fn same_address_payload(shipping: Value) -> Value {
    serde_json::json!({
        "shipping_address": shipping,
        "different_billing_address": false,
        "customer": { "email": "john@doe.com" }
    })
}
