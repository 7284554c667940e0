//! HTTP transport - one shared client, bounded retry, header-level logging

use std::time::Instant;

use base64::Engine;
use reqwest::{Method, Response};

use crate::config::{
    ApiConfig, CONNECT_TIMEOUT, MAX_ATTEMPTS, READ_TIMEOUT, REQUEST_TIMEOUT, RETRY_DELAY,
};

/// Shared HTTP plumbing under the typed API. Cloning is cheap and clones
/// share the connection pool.
#[derive(Clone)]
pub struct Transport {
    client: reqwest::Client,
    config: ApiConfig,
}

impl Transport {
    pub fn new(config: ApiConfig) -> Self {
        Transport {
            client: create_client(),
            config,
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub(crate) async fn get(&self, route: &str, api_key: &str) -> Result<Response, reqwest::Error> {
        self.execute(Method::GET, route, api_key, None).await
    }

    pub(crate) async fn put(
        &self,
        route: &str,
        api_key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Response, reqwest::Error> {
        self.execute(Method::PUT, route, api_key, Some((content_type.to_string(), body)))
            .await
    }

    pub(crate) async fn delete(
        &self,
        route: &str,
        api_key: &str,
    ) -> Result<Response, reqwest::Error> {
        self.execute(Method::DELETE, route, api_key, None).await
    }

    /// Run one logical request with bounded retry. Retries cover 5xx
    /// responses and transport failures only; every other completed
    /// response goes back to the caller as-is, whatever its status.
    async fn execute(
        &self,
        method: Method,
        route: &str,
        api_key: &str,
        body: Option<(String, Vec<u8>)>,
    ) -> Result<Response, reqwest::Error> {
        let url = self.config.url(route);
        let mut attempt = 1u32;

        loop {
            let req_builder = self.build_request(method.clone(), &url, api_key, body.as_ref());
            tracing::debug!(%method, %url, attempt, "Sending request");
            let started = Instant::now();
            let result = req_builder.send().await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(resp) if resp.status().is_server_error() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(%method, %url, status = %resp.status(), attempt, "Server error, retrying");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Ok(resp) => {
                    tracing::debug!(
                        %method,
                        %url,
                        status = %resp.status(),
                        attempt,
                        elapsed_ms,
                        headers = ?resp.headers(),
                        "Response received"
                    );
                    return Ok(resp);
                }
                Err(e) if is_retryable(&e) && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(%method, %url, error = %e, attempt, "Transport failure, retrying");
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(%method, %url, error = %e, attempt, elapsed_ms, "Request failed");
                    return Err(e);
                }
            }
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        api_key: &str,
        body: Option<&(String, Vec<u8>)>,
    ) -> reqwest::RequestBuilder {
        let mut req_builder = self.client.request(method, url);

        // Blank key means an anonymous request; the header is simply absent.
        if !api_key.trim().is_empty() {
            req_builder = req_builder.header("Authorization", basic_auth_header(api_key));
        }

        if let Some((content_type, bytes)) = body {
            req_builder = req_builder
                .header("Content-Type", content_type.as_str())
                .body(bytes.clone());
        }

        req_builder
    }
}

/// `Authorization` value for the service's key scheme: HTTP Basic with an
/// empty username and the API key as the password, encoded per call.
fn basic_auth_header(api_key: &str) -> String {
    let credentials = format!(":{}", api_key);
    let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
    format!("Basic {}", encoded)
}

/// Transport failures worth another attempt. Completed responses are judged
/// by status in the retry loop instead.
fn is_retryable(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}

/// Create the HTTP client with the service's timeout profile.
fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
