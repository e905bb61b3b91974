//! menu-cloud server binary

use std::net::SocketAddr;
use std::time::Duration;

use axum::ServiceExt;
use axum::extract::Request;
use menu_cloud::api;
use menu_cloud::config::Config;
use menu_cloud::error::BoxError;
use menu_cloud::state::AppState;

/// Housekeeping period for rate limiter, revocations and hub channels
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Config::from_env();
    tracing::info!(
        "Starting menu-cloud (env: {}, root domain: {})",
        config.environment,
        config.root_domain
    );
    let http_port = config.http_port;

    let state = AppState::new(config).await?;
    if state.backend.is_none() {
        tracing::warn!("Running in landing-only mode");
    }

    // Periodic cleanup
    let housekeeping = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            housekeeping.rate_limiter.cleanup().await;
            if let Some(backend) = &housekeeping.backend {
                backend.cleanup();
            }
        }
    });

    let app = api::build_service(state);

    let addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("menu-cloud HTTP listening on {addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("menu-cloud stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "menu_cloud=info,tower_http=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
