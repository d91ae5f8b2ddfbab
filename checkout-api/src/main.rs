use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use checkout_api::{app, worker, AppState, AuthConfig};
use checkout_order::{CartDefaults, CheckoutService, Repositories};
use checkout_store::{
    app_config::Config, DbClient, Fixtures, MemoryStore, PgCustomerRepository, PgOrderRepository,
    PgReferenceRepository,
};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkout_api=debug,checkout_order=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Checkout API on port {}", config.server.port);

    let repos = match &config.database.url {
        Some(url) => {
            let db = DbClient::new(url, config.database.max_connections)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;

            let reference = Arc::new(PgReferenceRepository::new(db.pool.clone()));
            Repositories {
                orders: Arc::new(PgOrderRepository::new(db.pool.clone())),
                customers: Arc::new(PgCustomerRepository::new(db.pool.clone())),
                countries: reference.clone(),
                shipping_methods: reference.clone(),
                payment_methods: reference,
            }
        }
        None => {
            tracing::warn!("No database.url configured, using the in-memory store");
            let store = Arc::new(MemoryStore::new());
            if let Some(path) = &config.fixtures.path {
                Fixtures::from_path(path)
                    .with_context(|| format!("Failed to read fixtures from {}", path))?
                    .load_into(&store)
                    .await
                    .context("Failed to load fixtures")?;
            }
            Repositories::from_store(store)
        }
    };

    // Checkout event channel
    let (events_tx, _) = broadcast::channel(256);

    let checkout = CheckoutService::new(
        repos,
        events_tx,
        CartDefaults {
            currency_code: config.checkout.default_currency.clone(),
            locale_code: config.checkout.default_locale.clone(),
        },
    );
    worker::spawn_event_logger(checkout.subscribe());

    let app_state = AppState {
        checkout: Arc::new(checkout),
        auth: AuthConfig::from(&config.auth),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
