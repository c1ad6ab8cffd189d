//! Mock HTTP server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use senpai_vision::transport::AUTH_HEADER;
use senpai_vision::VisionClient;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TEST_API_KEY: &str = "test-moondream-key";
pub const IMAGE_URL: &str = "https://images.example.com/kitchen.jpg";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server.
    pub fn client(&self) -> VisionClient {
        VisionClient::builder()
            .api_key(TEST_API_KEY)
            .base_url(&self.base_url)
            .build()
            .expect("client should build")
    }

    /// Successful JSON reply on `path`, requiring the auth header and a body containing `expected`.
    pub async fn mock_success(&self, path: &str, expected: Value, reply: Value) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .match_header(AUTH_HEADER, TEST_API_KEY)
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(expected))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(reply.to_string())
            .expect(1)
            .create_async()
            .await
    }

    /// Raw reply with arbitrary status and body text.
    pub async fn mock_raw(&self, path: &str, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(status)
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// A path that must never be hit.
    pub async fn mock_untouched(&self, path: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", path)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    }
}
