//! Velvet server - REST backend for the storefront and admin console.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `velvet-core` for all cart/coupon/pricing/order logic
//! - Pluggable storage (in-memory document store by default)
//! - Product catalog loaded from a JSON snapshot
//! - Stripe checkout sessions for external payment, or an offline
//!   provider when no key is configured
//!
//! Authentication is external: a gateway forwards the customer identity
//! in the `x-user-id` header, and admin routes take a bearer token.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use velvet_core::coupon::CouponBook;
use velvet_server::catalog::MemoryCatalog;
use velvet_server::config::ServerConfig;
use velvet_server::payment::{OfflineProvider, PaymentProvider, StripeProvider};
use velvet_server::routes;
use velvet_server::state::AppState;
use velvet_server::store::MemoryStore;

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn build_catalog(config: &ServerConfig) -> MemoryCatalog {
    match &config.catalog_path {
        Some(path) => match MemoryCatalog::load(path) {
            Ok(catalog) => {
                tracing::info!(products = catalog.len(), "catalog loaded");
                catalog
            }
            Err(e) => {
                tracing::error!("failed to load catalog: {e}");
                MemoryCatalog::default()
            }
        },
        None => {
            tracing::warn!("VELVET_CATALOG_PATH not set, catalog is empty");
            MemoryCatalog::default()
        }
    }
}

fn build_coupons(config: &ServerConfig) -> CouponBook {
    let Some(path) = &config.coupons_path else {
        return CouponBook::builtin();
    };
    std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
        .map(CouponBook::new)
        .unwrap_or_else(|e| {
            tracing::error!("failed to load coupons, using built-ins: {e}");
            CouponBook::builtin()
        })
}

fn build_payments(config: &ServerConfig) -> Arc<dyn PaymentProvider> {
    config.stripe_secret_key.as_ref().map_or_else(
        || {
            tracing::warn!("STRIPE_SECRET_KEY not set, using offline payment provider");
            Arc::new(OfflineProvider) as Arc<dyn PaymentProvider>
        },
        |key| Arc::new(StripeProvider::new(key.clone())) as Arc<dyn PaymentProvider>,
    )
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "velvet_server=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Assemble collaborators
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(build_catalog(&config));
    let payments = build_payments(&config);
    let coupons = build_coupons(&config);

    let state = AppState::new(config.clone(), store, catalog, payments, coupons);

    // Build router
    let app = routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    // Start server
    let addr = config.socket_addr();
    tracing::info!("velvet server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
