//! Typed operations against the Dropwell REST API
//!
//! Every operation resolves to an [`ApiResult`]: the expected 2xx decodes
//! into a typed value, any other completed response is interpreted as an
//! error body, and transport failures are synthesized into errors. Callers
//! never see a raw `reqwest` error or a panic.

use std::path::Path;

use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::client::transport::Transport;
use crate::config::{encode_path, encode_segment, ApiConfig};
use crate::error::{codes, ApiError, ApiResult};
use crate::models::{
    listing_order, DownloadProgress, FilesystemEntry, ListSummary, RemoteFile, UploadedFile,
};
use crate::source::ContentSource;

/// Error body the service sends on failed requests. `value` is the machine
/// code, `message` the human text; routes differ in which they fill.
#[derive(Debug, Deserialize)]
struct ApiFailure {
    #[serde(default)]
    #[allow(dead_code)] // Parsed for completeness, the status line already told us
    success: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilesEnvelope {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

#[derive(Debug, Deserialize)]
struct ChildrenEnvelope {
    #[serde(default)]
    children: Vec<FilesystemEntry>,
}

#[derive(Debug, Deserialize)]
struct ListsEnvelope {
    #[serde(default)]
    lists: Vec<ListSummary>,
}

/// Typed client for the Dropwell API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        ApiClient {
            transport: Transport::new(config),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        self.transport.config()
    }

    /// Upload a named blob as `application/octet-stream`. A blank key
    /// uploads anonymously; the service then hosts the file without an
    /// owning account.
    pub async fn upload_bytes(
        &self,
        api_key: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<UploadedFile> {
        self.upload(api_key, file_name, bytes, "application/octet-stream")
            .await
    }

    /// Resolve a content source and upload it under `file_name`, falling
    /// back to the source's own name hint when `file_name` is blank.
    pub async fn upload_source(
        &self,
        api_key: &str,
        file_name: &str,
        source: &dyn ContentSource,
    ) -> ApiResult<UploadedFile> {
        let resolved = source.resolve().await.map_err(|e| {
            ApiError::local(
                codes::SOURCE_UNREADABLE,
                format!("Could not read the selected content: {:#}", e),
            )
        })?;
        let name = if file_name.trim().is_empty() {
            resolved.name.clone().unwrap_or_default()
        } else {
            file_name.to_string()
        };
        self.upload(api_key, &name, resolved.bytes, &resolved.mime_type)
            .await
    }

    async fn upload(
        &self,
        api_key: &str,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> ApiResult<UploadedFile> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ApiError::local(
                codes::FILE_NAME_REQUIRED,
                "A file name is required",
            ));
        }

        let route = format!("file/{}", encode_segment(file_name));
        tracing::info!(file_name, size = bytes.len(), content_type, "Uploading file");
        let resp = self.transport.put(&route, api_key, content_type, bytes).await?;

        // The service answers a finished upload with 201 and the new id.
        // Anything else, 2xx included, is an error outcome.
        if resp.status() == StatusCode::CREATED {
            let uploaded: UploadedFile = decode_body(resp).await?;
            tracing::info!(id = %uploaded.id, "Upload complete");
            Ok(uploaded)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Details of a single file. Works without a key for public files.
    pub async fn file_info(&self, file_id: &str) -> ApiResult<RemoteFile> {
        let route = format!("file/{}/info", encode_segment(file_id));
        let resp = self.transport.get(&route, "").await?;
        if resp.status().is_success() {
            decode_body(resp).await
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Every file owned by the account, in the service's order. A blank key
    /// fails locally without touching the network.
    pub async fn user_files(&self, api_key: &str) -> ApiResult<Vec<RemoteFile>> {
        require_api_key(api_key)?;
        let resp = self.transport.get("user/files", api_key).await?;
        if resp.status().is_success() {
            let envelope: FilesEnvelope = decode_body(resp).await?;
            Ok(envelope.files)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Children of one remote filesystem path, in listing order.
    pub async fn filesystem_path(
        &self,
        api_key: &str,
        path: &str,
    ) -> ApiResult<Vec<FilesystemEntry>> {
        require_api_key(api_key)?;
        let route = format!("filesystem/{}", encode_path(path));
        let resp = self.transport.get(&route, api_key).await?;
        if resp.status().is_success() {
            let envelope: ChildrenEnvelope = decode_body(resp).await?;
            let mut children = envelope.children;
            children.sort_by(listing_order);
            Ok(children)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Shared lists owned by the account.
    pub async fn user_lists(&self, api_key: &str) -> ApiResult<Vec<ListSummary>> {
        require_api_key(api_key)?;
        let resp = self.transport.get("user/lists", api_key).await?;
        if resp.status().is_success() {
            let envelope: ListsEnvelope = decode_body(resp).await?;
            Ok(envelope.lists)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Permanently delete a file. Success carries no payload.
    pub async fn delete_file(&self, api_key: &str, file_id: &str) -> ApiResult<()> {
        require_api_key(api_key)?;
        let route = format!("file/{}", encode_segment(file_id));
        let resp = self.transport.delete(&route, api_key).await?;
        if resp.status().is_success() {
            tracing::info!(file_id, "File deleted");
            Ok(())
        } else {
            Err(error_from_response(resp).await)
        }
    }

    /// Stream a file's content to a local path, reporting progress after
    /// every chunk. Returns the bytes written. A failure mid-stream removes
    /// the partial file.
    pub async fn download_file<F>(
        &self,
        api_key: &str,
        file_id: &str,
        dest: &Path,
        mut on_progress: F,
    ) -> ApiResult<u64>
    where
        F: FnMut(DownloadProgress) + Send,
    {
        let route = format!("file/{}", encode_segment(file_id));
        let resp = self.transport.get(&route, api_key).await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let total = resp.content_length();
        let mut stream = resp.bytes_stream();
        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            ApiError::local(
                codes::DOWNLOAD_FAILED,
                format!("Could not create {}: {}", dest.display(), e),
            )
        })?;
        let mut received = 0u64;

        while let Some(chunk) = stream.next().await {
            let outcome = match chunk {
                Ok(bytes) => match file.write_all(&bytes).await {
                    Ok(()) => Ok(bytes.len() as u64),
                    Err(e) => Err(ApiError::local(
                        codes::DOWNLOAD_FAILED,
                        format!("Write failed: {}", e),
                    )),
                },
                Err(e) => Err(ApiError::from(e)),
            };

            match outcome {
                Ok(written) => {
                    received += written;
                    on_progress(DownloadProgress { received, total });
                }
                Err(e) => {
                    drop(file);
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(e);
                }
            }
        }

        if let Err(e) = file.flush().await {
            let _ = tokio::fs::remove_file(dest).await;
            return Err(ApiError::local(
                codes::DOWNLOAD_FAILED,
                format!("Write failed: {}", e),
            ));
        }

        tracing::info!(file_id, bytes = received, dest = %dest.display(), "Download complete");
        Ok(received)
    }
}

fn require_api_key(api_key: &str) -> ApiResult<()> {
    if api_key.trim().is_empty() {
        Err(ApiError::local(
            codes::API_KEY_REQUIRED,
            "An API key is required for this operation",
        ))
    } else {
        Ok(())
    }
}

/// Decode a JSON body from raw bytes. The service labels some JSON
/// responses `text/plain`, so the Content-Type header is never consulted.
async fn decode_body<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let bytes = resp.bytes().await.map_err(ApiError::from)?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::local(
            codes::INVALID_RESPONSE,
            format!("Unexpected response from server: {}", e),
        )
    })
}

/// Interpret a completed non-success response. A parseable error envelope
/// passes through; anything else is synthesized from the status line so the
/// failure still renders.
async fn error_from_response(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let fallback_code = format!("http_{}", status.as_u16());
    let bytes = match resp.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return ApiError::from(e),
    };

    match serde_json::from_slice::<ApiFailure>(&bytes) {
        Ok(failure) if failure.value.is_some() || failure.message.is_some() => ApiError {
            code: failure.value.or(Some(fallback_code)),
            message: failure.message,
        },
        _ => ApiError::new(fallback_code, format!("Server returned {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_api_key_rejects_whitespace() {
        let err = require_api_key("   ").unwrap_err();
        assert!(err.is_code(codes::API_KEY_REQUIRED));
        assert!(require_api_key("real-key").is_ok());
    }

    #[test]
    fn test_failure_envelope_tolerates_missing_fields() {
        let failure: ApiFailure = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert_eq!(failure.value, None);
        assert_eq!(failure.message, None);

        let failure: ApiFailure =
            serde_json::from_str(r#"{"success":false,"value":"not_found"}"#).unwrap();
        assert_eq!(failure.value.as_deref(), Some("not_found"));
    }
}
