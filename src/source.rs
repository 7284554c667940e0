//! Content sources feeding uploads
//!
//! A shell hands the client something readable (a file it picked, an
//! in-memory buffer, a platform document handle behind the shell's own
//! adapter). The upload path only needs bytes plus a MIME type, so that is
//! the whole seam.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

/// What the upload endpoint needs from a source.
#[derive(Clone, Debug)]
pub struct ResolvedContent {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Name hint when the source knows one, e.g. the on-disk file name.
    pub name: Option<String>,
}

/// Anything that can produce upload content. Object safe so holders can
/// carry `Arc<dyn ContentSource>` handed in by the shell.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn resolve(&self) -> Result<ResolvedContent>;
}

/// A file on the local filesystem. MIME type is guessed from the extension,
/// falling back to `application/octet-stream`.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ContentSource for FileSource {
    async fn resolve(&self) -> Result<ResolvedContent> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let mime_type = mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from);
        Ok(ResolvedContent {
            bytes,
            mime_type,
            name,
        })
    }
}

/// Bytes already in memory, for shells that buffer platform content handles
/// themselves.
#[derive(Clone, Debug)]
pub struct BytesSource {
    bytes: Vec<u8>,
    mime_type: String,
}

impl BytesSource {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        BytesSource {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

#[async_trait]
impl ContentSource for BytesSource {
    async fn resolve(&self) -> Result<ResolvedContent> {
        Ok(ResolvedContent {
            bytes: self.bytes.clone(),
            mime_type: self.mime_type.clone(),
            name: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_and_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        tokio::fs::write(&path, b"{\"a\":1}").await.unwrap();

        let resolved = FileSource::new(&path).resolve().await.unwrap();
        assert_eq!(resolved.bytes, b"{\"a\":1}");
        assert_eq!(resolved.mime_type, "application/json");
        assert_eq!(resolved.name.as_deref(), Some("notes.json"));
    }

    #[tokio::test]
    async fn test_file_source_unknown_extension_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzz9");
        tokio::fs::write(&path, b"x").await.unwrap();

        let resolved = FileSource::new(&path).resolve().await.unwrap();
        assert_eq!(resolved.mime_type, "application/octet-stream");
    }

    #[tokio::test]
    async fn test_file_source_missing_file_errors() {
        let source = FileSource::new("/nonexistent/definitely/missing.bin");
        assert!(source.resolve().await.is_err());
    }

    #[tokio::test]
    async fn test_bytes_source_passes_through() {
        let source = BytesSource::new(vec![1, 2, 3], "image/png");
        let resolved = source.resolve().await.unwrap();
        assert_eq!(resolved.bytes, vec![1, 2, 3]);
        assert_eq!(resolved.mime_type, "image/png");
        assert!(resolved.name.is_none());
    }
}
