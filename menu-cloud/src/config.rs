//! Service configuration

/// Credentials for the backing services. All of them or none.
#[derive(Debug, Clone)]
pub struct BackendCredentials {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Session token signing secret
    pub jwt_secret: String,
    /// Hosted identity provider API key
    pub identity_api_key: String,
    /// Hosted identity provider project
    pub identity_project_id: String,
    /// S3 bucket for menu images
    pub storage_bucket: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_port: u16,
    /// Canonical root domain; `<slug>.<root>` hosts map to storefronts
    pub root_domain: String,
    /// Hosting platform preview domains, never rewritten
    pub preview_domain_suffixes: Vec<String>,
    /// Public base URL for stored images (CDN); falls back to the bucket URL
    pub storage_public_base_url: Option<String>,
    /// Dashboard stats refresh interval
    pub dashboard_refresh_secs: u64,
    /// `None` = landing-only mode
    pub backend: Option<BackendCredentials>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Never fails: a missing backend credential leaves `backend` unset.
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let backend = BackendCredentials::from_env();
        if backend.is_none() {
            tracing::warn!(
                "Backend credentials incomplete, starting in landing-only mode. \
                 Set DATABASE_URL, JWT_SECRET, IDENTITY_API_KEY, IDENTITY_PROJECT_ID, \
                 STORAGE_BUCKET to enable."
            );
        }

        Self {
            environment,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            root_domain: std::env::var("ROOT_DOMAIN")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "bringthemenu.com".into())
                .to_ascii_lowercase(),
            preview_domain_suffixes: std::env::var("PREVIEW_DOMAIN_SUFFIXES")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| vec!["vercel.app".into(), "vercel.com".into()]),
            storage_public_base_url: optional_env("STORAGE_PUBLIC_BASE_URL"),
            dashboard_refresh_secs: std::env::var("DASHBOARD_REFRESH_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
            backend,
        }
    }

    /// Defaults for `root_domain` with no backend credentials
    pub fn new(root_domain: impl Into<String>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 8080,
            root_domain: root_domain.into().to_ascii_lowercase(),
            preview_domain_suffixes: vec!["vercel.app".into(), "vercel.com".into()],
            storage_public_base_url: None,
            dashboard_refresh_secs: 30,
            backend: None,
        }
    }
}

impl BackendCredentials {
    fn from_env() -> Option<Self> {
        Some(Self {
            database_url: optional_env("DATABASE_URL")?,
            jwt_secret: optional_env("JWT_SECRET")?,
            identity_api_key: optional_env("IDENTITY_API_KEY")?,
            identity_project_id: optional_env("IDENTITY_PROJECT_ID")?,
            storage_bucket: optional_env("STORAGE_BUCKET")?,
        })
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
