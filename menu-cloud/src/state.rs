//! Application state for menu-cloud
//!
//! Service handles are wired explicitly here. Without backend credentials
//! the state carries no [`Backend`], and every handler that extracts one
//! answers 503.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::AppError;

use crate::auth::{RateLimiter, SessionRevocations};
use crate::blob::{BlobStore, S3BlobStore};
use crate::config::{BackendCredentials, Config};
use crate::db::{PgStore, Store};
use crate::error::BoxError;
use crate::identity::{HostedIdentity, IdentityProvider};
use crate::live::{LiveConnections, OrderHub};
use crate::services::{
    AuthService, DashboardService, ImageService, MenuService, OrderService, TenantService,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Rate limiter for sign-in/sign-up routes
    pub rate_limiter: RateLimiter,
    /// `None` = landing-only mode
    pub backend: Option<Backend>,
}

impl AppState {
    /// Connect to the configured backends, or start landing-only.
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        let backend = match &config.backend {
            Some(creds) => Some(Backend::connect(creds, &config).await?),
            None => None,
        };
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: Config, backend: Option<Backend>) -> Self {
        Self {
            config: Arc::new(config),
            rate_limiter: RateLimiter::new(),
            backend,
        }
    }

    pub fn backend(&self) -> Result<&Backend, AppError> {
        self.backend.as_ref().ok_or_else(AppError::service_unavailable)
    }
}

/// Services that need the backing store, identity provider and blob store
#[derive(Clone)]
pub struct Backend {
    pub tenants: TenantService,
    pub menu: MenuService,
    pub images: ImageService,
    pub orders: OrderService,
    pub dashboard: DashboardService,
    pub auth: AuthService,
    /// Open live WebSocket sessions per restaurant
    pub live_connections: LiveConnections,
}

impl Backend {
    /// Wire every service over the given backends.
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
        jwt_secret: &str,
        dashboard_refresh_secs: u64,
    ) -> Self {
        let tenants = TenantService::new(store.clone());
        let menu = MenuService::new(store.clone());
        Self {
            images: ImageService::new(menu.clone(), blobs),
            orders: OrderService::new(store.clone(), OrderHub::new()),
            dashboard: DashboardService::new(store, dashboard_refresh_secs),
            auth: AuthService::new(
                identity,
                tenants.clone(),
                SessionRevocations::new(),
                jwt_secret,
            ),
            tenants,
            menu,
            live_connections: LiveConnections::new(),
        }
    }

    async fn connect(creds: &BackendCredentials, config: &Config) -> Result<Self, BoxError> {
        let store = PgStore::connect(&creds.database_url).await?;
        tracing::info!("Database connected, migrations applied");

        let identity = HostedIdentity::new(&creds.identity_api_key, &creds.identity_project_id);
        let blobs = S3BlobStore::from_env(
            &creds.storage_bucket,
            config.storage_public_base_url.clone(),
        )
        .await;

        Ok(Self::new(
            Arc::new(store),
            Arc::new(identity),
            Arc::new(blobs),
            &creds.jwt_secret,
            config.dashboard_refresh_secs,
        ))
    }

    /// Periodic housekeeping: expired revocations, idle feed channels.
    pub fn cleanup(&self) {
        let now = chrono::Utc::now().timestamp() as usize;
        let sessions = self.auth.sessions().cleanup(now);
        let channels = self.orders.hub().cleanup();
        if sessions + channels > 0 {
            tracing::debug!(sessions, channels, "Backend cleanup");
        }
    }
}

impl FromRequestParts<AppState> for Backend {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state.backend().cloned()
    }
}
