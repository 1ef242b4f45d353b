//! PawnVault Backend Server
//!
//! HTTP server for the pawn shop management API: customers, loans,
//! repayments, reports and staff authentication.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use pawnvault_server::auth::{AuthService, OtpStore};
use pawnvault_server::config::{Config, StorageBackend};
use pawnvault_server::routes;
use pawnvault_server::services::{status_sweeper, CustomerService, LoanService};
use pawnvault_server::sms::SmsClient;
use pawnvault_server::state::AppState;
use pawnvault_server::storage::Storage;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .init();

    tracing::info!(environment = config.environment.as_str(), "starting server");

    let storage = match config.storage_backend {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Storage::in_memory()
        }
        StorageBackend::Postgres => {
            // Presence of DATABASE_URL is enforced by Config::from_env
            let database_url = config.database_url.clone().unwrap_or_default();
            tracing::info!(
                url = %config.database_url_masked().unwrap_or_default(),
                "connecting to database"
            );
            let pool = match PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(&database_url)
                .await
            {
                Ok(pool) => pool,
                Err(e) => {
                    eprintln!("Failed to connect to database: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                eprintln!("Failed to run migrations: {}", e);
                std::process::exit(1);
            }
            tracing::info!("database connected");
            Storage::postgres(pool)
        }
    };

    let sms = Arc::new(SmsClient::new(
        config.sms_service_url.clone(),
        config.sms_api_key.clone(),
        config.shop_name.clone(),
    ));

    let loan_service = LoanService::new(storage.clone(), sms.clone());
    let customer_service = CustomerService::new(storage.clone());
    let auth_service = Arc::new(AuthService::new(
        storage.users.clone(),
        config.jwt_secret.clone(),
        config.jwt_token_ttl_seconds,
    ));
    let otp_store = Arc::new(OtpStore::new(config.otp_ttl_seconds as u64));

    let app_state = AppState {
        loan_service: loan_service.clone(),
        customer_service,
        auth_service,
        otp_store,
        sms,
        environment: config.environment,
    };

    // Periodic status sweep keeps stored loan statuses from drifting
    let sweep_interval = config.status_sync_interval_seconds;
    tokio::spawn(async move {
        tracing::info!(interval_seconds = sweep_interval, "status sweeper started");
        status_sweeper(loan_service, sweep_interval).await;
        tracing::error!("status sweeper exited unexpectedly");
    });

    let app = routes::app_router()
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let Some(allowed_origins) = allowed_origins.filter(|s| !s.is_empty()) else {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    };

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
