//! Shared harness for integration tests: a mock Dropwell server plus a
//! client and preferences wired to it.

// Each test binary compiles this module on its own and none of them uses
// every helper.
#![allow(dead_code)]

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropwell_client::{ApiClient, ApiConfig, MemoryPreferences};

/// Key every authenticated fixture uses.
pub const TEST_API_KEY: &str = "test-key";

/// `Authorization` value the client derives from [`TEST_API_KEY`]:
/// base64 of ":test-key" under the Basic scheme.
pub const TEST_AUTH_HEADER: &str = "Basic OnRlc3Qta2V5";

pub struct TestContext {
    pub server: MockServer,
    pub client: ApiClient,
    pub prefs: Arc<MemoryPreferences>,
}

impl TestContext {
    /// Fresh mock server with a client pointed at it and the test key
    /// already stored.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let client = ApiClient::new(ApiConfig::new(server.uri()));
        let prefs = Arc::new(MemoryPreferences::with_api_key(TEST_API_KEY));
        TestContext {
            server,
            client,
            prefs,
        }
    }

    /// Same harness without a stored key, for the unauthenticated flows.
    pub async fn without_key() -> Self {
        let ctx = Self::new().await;
        TestContext {
            prefs: Arc::new(MemoryPreferences::new()),
            ..ctx
        }
    }

    /// Requests the server has seen so far.
    pub async fn recorded_requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    // =========================================================================
    // Mock endpoint helpers
    // =========================================================================

    /// Mock a finished upload: 201 with the assigned id.
    pub async fn mock_upload_created(&self, file_name: &str, id: &str) {
        Mock::given(method("PUT"))
            .and(path(format!("/file/{}", file_name)))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": id
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock the account file listing.
    pub async fn mock_user_files(&self, files: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/user/files"))
            .and(header("authorization", TEST_AUTH_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "files": files
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock one file's info route.
    pub async fn mock_file_info(&self, id: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/file/{}/info", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a filesystem listing for `fs_path` (already encoded).
    pub async fn mock_filesystem(&self, fs_path: &str, children: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/filesystem/{}", fs_path)))
            .and(header("authorization", TEST_AUTH_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "children": children
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock the shared lists route.
    pub async fn mock_user_lists(&self, lists: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/user/lists"))
            .and(header("authorization", TEST_AUTH_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "lists": lists
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock a successful delete. The service answers with a bare success
    /// envelope.
    pub async fn mock_delete(&self, id: &str) {
        Mock::given(method("DELETE"))
            .and(path(format!("/file/{}", id)))
            .and(header("authorization", TEST_AUTH_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true
            })))
            .mount(&self.server)
            .await;
    }

    /// Mock an error outcome with the service's failure envelope.
    pub async fn mock_error(&self, http_method: &str, route: &str, status: u16, value: &str, message: &str) {
        Mock::given(method(http_method))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "success": false,
                "value": value,
                "message": message
            })))
            .mount(&self.server)
            .await;
    }
}

/// Wire JSON for one file, with only the interesting fields varying.
pub fn file_json(id: &str, name: &str, size: u64, uploaded: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "size": size,
        "date_upload": uploaded,
        "mime_type": "application/octet-stream"
    })
}

/// Wire JSON for one filesystem entry.
pub fn entry_json(name: &str, kind: &str, modified: &str) -> serde_json::Value {
    serde_json::json!({
        "path": format!("me/{}", name),
        "name": name,
        "type": kind,
        "size": 64,
        "modified": modified
    })
}
