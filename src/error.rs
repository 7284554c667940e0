//! Error model shared by every API operation
//!
//! A failed operation always surfaces as an [`ApiError`], whether the
//! service rejected the request, the transport gave up, or the input never
//! left the device. Holders turn it into display text with
//! [`ApiError::user_message`]; nothing above the client layer sees raw
//! `reqwest` errors.

use thiserror::Error;

/// Codes synthesized on this side of the wire. Service-issued codes arrive
/// verbatim in the error body's `value` field and are not enumerated here.
pub mod codes {
    pub const TIMEOUT: &str = "timeout";
    pub const CONNECTION_FAILED: &str = "connection_failed";
    pub const TRANSPORT_ERROR: &str = "transport_error";
    pub const INVALID_RESPONSE: &str = "invalid_response";
    pub const API_KEY_REQUIRED: &str = "api_key_required";
    pub const FILE_NAME_REQUIRED: &str = "file_name_required";
    pub const SOURCE_UNREADABLE: &str = "source_unreadable";
    pub const DOWNLOAD_FAILED: &str = "download_failed";
}

/// Failure outcome of an API operation.
///
/// Both fields are optional because the service omits them on some routes.
/// `code` is machine-matchable (service `value` or a synthesized code);
/// `message` is human text when the service provided one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{}", self.user_message())]
pub struct ApiError {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError {
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    /// Error produced locally, before or instead of a wire exchange.
    pub fn local(code: &str, message: impl Into<String>) -> Self {
        ApiError::new(code, message)
    }

    /// Display text, never empty: message first, code as fallback.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            message.to_string()
        } else if let Some(code) = self.code.as_deref().filter(|c| !c.is_empty()) {
            code.to_string()
        } else {
            String::from("Unknown error")
        }
    }

    pub fn is_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::local(codes::TIMEOUT, "Request timed out (60s)")
        } else if e.is_connect() {
            ApiError::local(codes::CONNECTION_FAILED, format!("Connection failed: {}", e))
        } else {
            ApiError::local(codes::TRANSPORT_ERROR, format!("Request failed: {}", e))
        }
    }
}

/// Outcome of every API operation: typed value or displayable failure.
pub type ApiResult<T> = Result<T, ApiError>;
