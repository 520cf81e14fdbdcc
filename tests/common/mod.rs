//! In-process harness: the full router over an in-memory store.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use gatekeeper::infrastructure::{JwtConfig, PasswordHasher, RateLimiter, TokenService};
use gatekeeper::{create_api_router, AppState, InMemoryStore, RouterOptions};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin12345";
pub const USER_PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub struct Raw {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_rate_limit(10_000).await
    }

    pub async fn with_rate_limit(requests: u32) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let tokens = Arc::new(TokenService::new(JwtConfig::default()));
        let state = AppState::new(store.clone(), PasswordHasher::new(4), tokens);

        let created = state
            .users
            .ensure_bootstrap_admin(ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .unwrap();
        assert!(created);

        let router = create_api_router(
            state,
            RouterOptions {
                allowed_origins: vec!["*".to_string()],
                rate_limiter: Arc::new(RateLimiter::new(requests, Duration::from_secs(60))),
                metrics: None,
            },
        );

        Self { router, store }
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Raw {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        Raw {
            status,
            headers,
            body,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let raw = self.raw(method, uri, token, body).await;
        let json = serde_json::from_slice(&raw.body).unwrap_or(Value::Null);
        (raw.status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn login_pair(&self, username: &str, password: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"username": username, "password": password})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login of {username} failed: {body}");
        body
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        self.login_pair(username, password).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn create_checkpoint(&self, admin: &str, checkpoint_id: &str) {
        let (status, body) = self
            .post(
                "/api/v1/admin/checkpoints",
                admin,
                json!({"checkpoint_id": checkpoint_id, "name": format!("Gate {checkpoint_id}")}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    /// Creates a user with [`USER_PASSWORD`] and returns its id.
    pub async fn create_user(
        &self,
        admin: &str,
        username: &str,
        role: &str,
        checkpoints: &[&str],
        supervisor_id: Option<&str>,
    ) -> String {
        let (status, body) = self
            .post(
                "/api/v1/admin/users",
                admin,
                json!({
                    "username": username,
                    "password": USER_PASSWORD,
                    "role": role,
                    "allowed_checkpoints": checkpoints,
                    "supervisor_id": supervisor_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["user_id"].as_str().unwrap().to_string()
    }
}

pub fn entry(record_id: &str, checkpoint_id: &str, author: &str) -> Value {
    json!({
        "record_id": record_id,
        "checkpoint_id": checkpoint_id,
        "entry_type": "TRUCK",
        "logging_user_id": author,
        "client_ts": "2025-03-01T08:30:00Z",
        "status": "ACTIVE",
        "payload": {"plate": "01A123BC", "driver": "K. Rashidov"}
    })
}

pub fn record_ids(body: &Value) -> Vec<String> {
    body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["record_id"].as_str().unwrap().to_string())
        .collect()
}
