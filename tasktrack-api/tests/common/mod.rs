/// Common test utilities for integration tests
///
/// Builds the real router over an in-memory store, so these tests need no
/// database. Requests go through `tower::Service::call` exactly as the
/// server would dispatch them.

use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tasktrack_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktrack_shared::store::MemoryStore;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router and its state
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
}

/// A registered user and their token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestContext {
    /// Creates a fresh context with an empty store
    pub fn new() -> anyhow::Result<Self> {
        let static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../frontend");
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "postgres://unused/tasktrack"),
            ("JWT_SECRET", TEST_SECRET),
            ("STATIC_DIR", static_dir),
            // Cheap hashing keeps the suite fast
            ("PASSWORD_MEMORY_KIB", "1024"),
            ("PASSWORD_ITERATIONS", "1"),
            ("PASSWORD_PARALLELISM", "1"),
        ]);

        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;
        let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
        let app = build_router(state.clone());

        Ok(Self { app, state })
    }

    /// Sends a request and returns the status and the JSON body
    /// (`Value::Null` when the body is empty or not JSON)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prepared request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);

        (status, json)
    }

    /// Registers a user and returns their ID and token
    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestUser {
        let (status, body) = self
            .send(
                Method::POST,
                "/users/register",
                None,
                Some(serde_json::json!({ "name": name, "email": email, "password": password })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        TestUser {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates a task for `user` and returns its JSON
    pub async fn create_task(&self, user: &TestUser, title: &str) -> Value {
        let (status, body) = self
            .send(
                Method::POST,
                "/tasks",
                Some(&user.token),
                Some(serde_json::json!({ "title": title })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body
    }
}
