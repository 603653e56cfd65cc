//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use stitchgrid::models::{AppConfig, DisplayParams, GenerationParams};
use stitchgrid::server::{build_router, create_app_state, AppState};

use super::fixtures;

/// Test application with router and direct access to state
pub struct TestApp {
    router: axum::Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a new in-memory test application with small charts
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from a custom configuration
    pub async fn with_config(config: AppConfig) -> Self {
        // Create application state using shared server module
        let state = create_app_state(config)
            .await
            .expect("Failed to create app state");

        // Build router using shared server module (same as production)
        let router = build_router(state.clone());

        Self { router, state }
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request without a body
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request(Request::post(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let builder = Request::post(path).header("Content-Type", "application/json");
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// Make a POST request with a raw binary body
    pub async fn post_bytes(&self, path: &str, body: Vec<u8>) -> TestResponse {
        let builder = Request::post(path).header("Content-Type", "application/octet-stream");
        self.request(builder.body(Body::from(body)).unwrap()).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Create a session and return its id
    pub async fn create_session(&self) -> String {
        let response = self.post("/api/session").await;
        assert_eq!(response.status, StatusCode::OK);

        let json: serde_json::Value = response.json();
        json["session_id"].as_str().unwrap().to_string()
    }

    /// Create a session, upload the stripes fixture and generate its chart
    pub async fn generated_session(&self) -> String {
        let id = self.create_session().await;

        let response = self
            .post_bytes(&format!("/api/upload/{id}"), fixtures::stripes_png())
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let response = self.post(&format!("/api/generate/{id}")).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        id
    }

    /// Current palette report as JSON
    pub async fn palette(&self, id: &str) -> Vec<serde_json::Value> {
        let response = self.get(&format!("/api/palette/{id}")).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());
        response.json()
    }
}

/// Small charts with few colors keep the tests fast
pub fn test_config() -> AppConfig {
    AppConfig {
        generation: GenerationParams {
            max_colors: 8,
            ..Default::default()
        },
        display: DisplayParams {
            grid_width_cells: fixtures::STRIPES_WIDTH,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
