//! Service endpoints and transport tuning
//!
//! Centralized location for magic strings and configuration defaults.

use std::time::Duration;

/// Production API root
pub const DEFAULT_API_BASE_URL: &str = "https://dropwell.net/api";

/// Total budget for one request attempt, body included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// TCP + TLS connect budget
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Socket idle budget while a response is being read
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Attempts per logical request, the first try included
pub const MAX_ATTEMPTS: u32 = 3;

/// Base pause between attempts, scaled by the attempt number
pub const RETRY_DELAY: Duration = Duration::from_millis(250);

/// Root path of the remote filesystem as the service names it
pub const FILESYSTEM_ROOT: &str = "me";

/// Preferences key holding the account API key
pub const PREF_API_KEY: &str = "api_key";

/// Where the API client points. Defaults to the production host; tests swap
/// in a local mock server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        ApiConfig { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a route onto the API root. The leading slash is optional.
    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig::new(DEFAULT_API_BASE_URL)
    }
}

/// Percent-encode a single URL path segment so file names containing
/// slashes, spaces or '%' survive route assembly.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Encode a filesystem path segment by segment, keeping `/` separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
