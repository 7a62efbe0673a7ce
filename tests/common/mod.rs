#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use postboard_api::config::{AppConfig, PasswordHashConfig};
use postboard_api::database::MemoryStore;
use postboard_api::storage::{FileDisposer, FileError};
use postboard_api::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret1";

/// Keeps disposed image references instead of deleting files
#[derive(Debug, Default)]
pub struct RecordingDisposer {
    disposed: Mutex<Vec<String>>,
}

impl RecordingDisposer {
    pub fn disposed(&self) -> Vec<String> {
        self.disposed.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileDisposer for RecordingDisposer {
    async fn dispose(&self, image_ref: &str) -> Result<(), FileError> {
        self.disposed.lock().unwrap().push(image_ref.to_string());
        Ok(())
    }
}

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub files: Arc<RecordingDisposer>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development(TEST_SECRET);
    config.security.password_hash = PasswordHashConfig::minimal();
    config.api.enable_request_logging = false;
    config
}

pub fn test_app() -> TestApp {
    test_app_with(test_config())
}

pub fn test_app_with(config: AppConfig) -> TestApp {
    let files = Arc::new(RecordingDisposer::default());
    let state = AppState::new(config, Arc::new(MemoryStore::new()), files.clone())
        .expect("test state should build");

    TestApp {
        router: postboard_api::app(state.clone()),
        state,
        files,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Register an account with [`PASSWORD`] and return its id
    pub async fn register(&self, email: &str, name: &str) -> Result<String> {
        let res = self
            .post(
                "/auth/register",
                None,
                json!({"email": email, "name": name, "password": PASSWORD}),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "register failed: {}", res.body);
        Ok(res.body["data"]["id"].as_str().unwrap_or_default().to_string())
    }

    pub async fn login(&self, email: &str) -> Result<String> {
        let res = self
            .post("/auth/login", None, json!({"email": email, "password": PASSWORD}))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {}", res.body);
        Ok(res.body["data"]["token"].as_str().unwrap_or_default().to_string())
    }

    /// Register and log in, returning the bearer token
    pub async fn sign_up(&self, email: &str, name: &str) -> Result<String> {
        self.register(email, name).await?;
        self.login(email).await
    }

    /// Create a post and return its id
    pub async fn create_post(&self, token: &str, title: &str) -> Result<String> {
        let res = self
            .post(
                "/api/posts",
                Some(token),
                json!({"title": title, "content": "Some body text", "imageUrl": "images/a.png"}),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {}", res.body);
        Ok(res.body["data"]["id"].as_str().unwrap_or_default().to_string())
    }
}

/// Error bodies are exactly `{message, data, status}`
pub fn assert_error_shape(res: &TestResponse) {
    let obj = res.body.as_object().expect("error body should be an object");
    assert_eq!(obj.len(), 3, "unexpected error body: {}", res.body);
    assert!(obj["message"].is_string());
    assert_eq!(obj["status"], res.status.as_u16());
}
