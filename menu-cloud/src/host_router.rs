//! Host Router: hostname → storefront namespace rewrite
//!
//! Runs in front of the axum router on every request:
//!
//! ```text
//! pizzahut.bringthemenu.com/menu  ──►  /restaurant/pizzahut/menu
//! www.bringthemenu.com/menu       ──►  /menu            (root domain)
//! bringthemenu.com/favicon.ico    ──►  /favicon.ico     (static asset)
//! ```
//!
//! The decision is a pure, synchronous function of (host, path).

use axum::extract::Request;
use http::Uri;
use http::header::HOST;
use http::uri::PathAndQuery;
use std::net::IpAddr;
use std::sync::Arc;

/// Static asset extensions (matched case-insensitively on the last path segment)
const STATIC_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "gif", "png", "svg", "ico", "webp", "woff", "woff2", "ttf", "eot",
];

/// Framework/internal path prefixes that are never tenant-scoped
const EXEMPT_PREFIXES: &[&str] = &["/_next/", "/static/"];

/// First labels that never name a tenant
const RESERVED_LABELS: &[&str] = &["www", "bringthemenu", "localhost"];

/// Where the storefront namespace lives
pub const STOREFRONT_PREFIX: &str = "/restaurant";

/// Whether `label` can never name a tenant subdomain
pub fn is_reserved_label(label: &str) -> bool {
    RESERVED_LABELS.contains(&label)
}

/// Outcome of a routing decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Leave the request untouched
    PassThrough,
    /// Replace the path (query string is kept by the caller)
    Rewrite(String),
}

#[derive(Debug, Clone)]
pub struct HostRouter {
    root_domain: String,
    www_domain: String,
    preview_suffixes: Vec<String>,
}

impl HostRouter {
    pub fn new(root_domain: impl Into<String>, preview_suffixes: Vec<String>) -> Self {
        let root_domain = root_domain.into().to_ascii_lowercase();
        Self {
            www_domain: format!("www.{root_domain}"),
            root_domain,
            preview_suffixes: preview_suffixes
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Decide whether `path` on `host` belongs to a tenant storefront.
    pub fn route(&self, host: &str, path: &str) -> Route {
        // (a) static assets and framework paths, any host
        if is_exempt_path(path) {
            return Route::PassThrough;
        }

        let hostname = strip_port(host).trim_end_matches('.').to_ascii_lowercase();
        // Extra exemption beyond (a)-(d): IP literals carry no tenant label
        // (health checks and direct hits on the load balancer)
        if hostname.is_empty() || hostname.parse::<IpAddr>().is_ok() {
            return Route::PassThrough;
        }

        // (b) canonical root and www
        if hostname == self.root_domain || hostname == self.www_domain {
            return Route::PassThrough;
        }

        // (c) reserved first labels; a dot-less host is its own first label
        let label = first_label(&hostname);
        if label.is_empty() || is_reserved_label(label) {
            return Route::PassThrough;
        }

        // (d) hosting platform preview deployments
        if self.is_preview_host(&hostname) {
            return Route::PassThrough;
        }

        Route::Rewrite(format!("{STOREFRONT_PREFIX}/{label}{path}"))
    }

    fn is_preview_host(&self, hostname: &str) -> bool {
        self.preview_suffixes.iter().any(|suffix| {
            hostname == suffix
                || hostname
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|rest| rest.ends_with('.'))
        })
    }

    /// Apply [`HostRouter::route`] to a request, rewriting its URI in place.
    pub fn rewrite_request(&self, mut request: Request) -> Request {
        let host = request_host(&request);
        let Route::Rewrite(new_path) = self.route(&host, request.uri().path()) else {
            return request;
        };

        let path_and_query = match request.uri().query() {
            Some(query) => format!("{new_path}?{query}"),
            None => new_path,
        };

        match rebuild_uri(request.uri(), &path_and_query) {
            Ok(uri) => {
                tracing::debug!(host = %host, to = %uri, "Host rewrite");
                *request.uri_mut() = uri;
            }
            Err(e) => {
                // e.g. a host label with characters that are not valid in a path
                tracing::debug!(host = %host, error = %e, "Host rewrite skipped");
            }
        }
        request
    }
}

/// Build a closure suitable for `tower::util::MapRequestLayer`.
pub fn rewrite_layer_fn(router: Arc<HostRouter>) -> impl Fn(Request) -> Request + Clone {
    move |request| router.rewrite_request(request)
}

/// Static asset or framework-internal path
pub fn is_exempt_path(path: &str) -> bool {
    if path == "/api" || path.starts_with("/api/") {
        return true;
    }
    if EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    is_static_asset(path)
}

pub fn is_static_asset(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rsplit_once('.') {
        Some((_, ext)) => STATIC_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// `host:port` → `host`. Bracketed IPv6 literals keep their address.
pub fn strip_port(host: &str) -> &str {
    let host = host.trim();
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or("");
    }
    host.split(':').next().unwrap_or("")
}

/// Portion before the first `.`; the whole hostname if there is no dot.
pub fn first_label(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or("")
}

/// `Host` header, else the URI authority (HTTP/2), else empty.
fn request_host(request: &Request) -> String {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

fn rebuild_uri(original: &Uri, path_and_query: &str) -> Result<Uri, http::Error> {
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn router() -> HostRouter {
        HostRouter::new(
            "bringthemenu.com",
            vec!["vercel.app".to_string(), "vercel.com".to_string()],
        )
    }

    fn rewrite(path: &str) -> Route {
        Route::Rewrite(path.to_string())
    }

    #[test]
    fn tenant_subdomain_rewrites() {
        let r = router();
        assert_eq!(
            r.route("pizzahut.bringthemenu.com", "/menu"),
            rewrite("/restaurant/pizzahut/menu")
        );
        assert_eq!(
            r.route("pizzahut.bringthemenu.com", "/"),
            rewrite("/restaurant/pizzahut/")
        );
        assert_eq!(
            r.route("acme.bringthemenu.com:3000", "/table/5"),
            rewrite("/restaurant/acme/table/5")
        );
    }

    #[test]
    fn root_and_www_pass_through() {
        let r = router();
        for path in ["/", "/menu", "/restaurant/acme", "/dashboard"] {
            assert_eq!(r.route("bringthemenu.com", path), Route::PassThrough);
            assert_eq!(r.route("www.bringthemenu.com", path), Route::PassThrough);
            assert_eq!(r.route("WWW.BringTheMenu.com:443", path), Route::PassThrough);
        }
    }

    #[test]
    fn static_assets_pass_through_on_any_host() {
        let r = router();
        for path in [
            "/favicon.ico",
            "/logo.PNG",
            "/images/hero.webp",
            "/fonts/inter.woff2",
            "/_next/static/chunk.js",
        ] {
            assert_eq!(r.route("bringthemenu.com", path), Route::PassThrough);
            assert_eq!(r.route("pizzahut.bringthemenu.com", path), Route::PassThrough);
        }
        // extension only counts on the last segment
        assert_eq!(
            r.route("acme.bringthemenu.com", "/img.png/menu"),
            rewrite("/restaurant/acme/img.png/menu")
        );
    }

    #[test]
    fn api_paths_pass_through() {
        let r = router();
        assert_eq!(r.route("acme.bringthemenu.com", "/api/orders"), Route::PassThrough);
        assert_eq!(
            r.route("acme.bringthemenu.com", "/apiary"),
            rewrite("/restaurant/acme/apiary")
        );
    }

    #[test]
    fn reserved_labels_pass_through() {
        let r = router();
        assert_eq!(r.route("localhost", "/menu"), Route::PassThrough);
        assert_eq!(r.route("localhost:3000", "/menu"), Route::PassThrough);
        assert_eq!(r.route("bringthemenu.vercel.app", "/"), Route::PassThrough);
        assert_eq!(r.route("www.other.com", "/"), Route::PassThrough);
    }

    #[test]
    fn preview_domains_pass_through() {
        let r = router();
        assert_eq!(
            r.route("my-app-git-main-team.vercel.app", "/menu"),
            Route::PassThrough
        );
        assert_eq!(r.route("vercel.com", "/"), Route::PassThrough);
        // suffix must sit on a label boundary
        assert_eq!(
            r.route("notvercel.app", "/"),
            rewrite("/restaurant/notvercel/")
        );
    }

    #[test]
    fn empty_or_malformed_host_passes_through() {
        let r = router();
        assert_eq!(r.route("", "/menu"), Route::PassThrough);
        assert_eq!(r.route(":8080", "/menu"), Route::PassThrough);
        assert_eq!(r.route(".bringthemenu.com", "/menu"), Route::PassThrough);
        assert_eq!(r.route("127.0.0.1:8080", "/health"), Route::PassThrough);
        assert_eq!(r.route("[::1]:8080", "/health"), Route::PassThrough);
    }

    #[test]
    fn dotless_host_uses_whole_name() {
        let r = router();
        assert_eq!(r.route("kiosk", "/menu"), rewrite("/restaurant/kiosk/menu"));
    }

    #[test]
    fn helpers() {
        assert_eq!(strip_port("a.b.com:8080"), "a.b.com");
        assert_eq!(strip_port("[::1]:80"), "::1");
        assert_eq!(first_label("a.b.com"), "a");
        assert_eq!(first_label("localhost"), "localhost");
        assert!(is_static_asset("/x/y.JPEG"));
        assert!(!is_static_asset("/menu"));
        assert!(!is_static_asset("/archive.tar"));
    }

    #[test]
    fn rewrite_request_keeps_query_and_headers() {
        let r = router();
        let request = Request::builder()
            .uri("/table/5?lang=en")
            .header(HOST, "acme.bringthemenu.com")
            .header("x-custom", "1")
            .body(Body::empty())
            .unwrap();

        let rewritten = r.rewrite_request(request);
        assert_eq!(rewritten.uri().path(), "/restaurant/acme/table/5");
        assert_eq!(rewritten.uri().query(), Some("lang=en"));
        assert_eq!(rewritten.headers()["x-custom"], "1");
    }

    #[test]
    fn rewrite_request_without_host_is_untouched() {
        let r = router();
        let request = Request::builder().uri("/menu").body(Body::empty()).unwrap();
        let same = r.rewrite_request(request);
        assert_eq!(same.uri().path(), "/menu");
    }
}
