//! Shared harness: the full service over in-memory backends

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use menu_cloud::api::build_service;
use menu_cloud::blob::MemoryBlobStore;
use menu_cloud::config::Config;
use menu_cloud::db::MemoryStore;
use menu_cloud::identity::MemoryIdentity;
use menu_cloud::state::{AppState, Backend};
use serde_json::Value;
use tower::ServiceExt;

pub const ROOT: &str = "bringthemenu.com";

pub struct TestApp {
    pub state: AppState,
    pub blobs: MemoryBlobStore,
    pub identity: MemoryIdentity,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_identity(MemoryIdentity::new())
    }

    pub fn with_identity(identity: MemoryIdentity) -> Self {
        let blobs = MemoryBlobStore::new();
        let backend = Backend::new(
            Arc::new(MemoryStore::new()),
            Arc::new(identity.clone()),
            Arc::new(blobs.clone()),
            "integration-secret",
            30,
        );
        Self {
            state: AppState::with_backend(Config::new(ROOT), Some(backend)),
            blobs,
            identity,
        }
    }

    /// No backend credentials
    pub fn landing_only() -> Self {
        Self {
            state: AppState::with_backend(Config::new(ROOT), None),
            blobs: MemoryBlobStore::new(),
            identity: MemoryIdentity::new(),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_service(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, host: &str, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("GET", host, path, token, None)).await
    }

    pub async fn post(
        &self,
        host: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(request("POST", host, path, token, Some(body))).await
    }

    pub async fn put(
        &self,
        host: &str,
        path: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(request("PUT", host, path, token, Some(body))).await
    }

    pub async fn delete(&self, host: &str, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request("DELETE", host, path, token, None)).await
    }

    /// Sign up an owner; returns (token, restaurant json)
    pub async fn sign_up(&self, email: &str, restaurant_name: &str) -> (String, Value) {
        let (status, body) = self
            .post(
                ROOT,
                "/api/auth/sign-up",
                None,
                serde_json::json!({
                    "email": email,
                    "password": "Secret123",
                    "restaurant_name": restaurant_name,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let token = body["token"].as_str().unwrap().to_string();
        (token, body["restaurant"].clone())
    }

    pub async fn add_item(&self, token: &str, name: &str, category: &str, price: f64) -> i64 {
        let (status, body) = self
            .post(
                ROOT,
                "/api/menu",
                Some(token),
                serde_json::json!({
                    "name": name,
                    "category": category,
                    "price": price,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_i64().unwrap()
    }
}

pub fn request(
    method: &str,
    host: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path).header("host", host);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Error code from an `ApiResponse` error body
pub fn code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}
