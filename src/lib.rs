//! # Dropwell Client
//!
//! Client core for the Dropwell file hosting service: a typed async API
//! client plus one state holder per screen, ready to sit under any shell
//! (mobile bindings, desktop app, TUI).
//!
//! ## Features
//! - Uploads from memory or any content source
//! - File details, account file listing, shared lists
//! - Remote filesystem browsing rooted at `me`
//! - Streaming downloads with per-chunk progress
//! - Bounded retry on server and transport failures
//! - API key storage behind a minimal preferences interface
//!
//! ## Architecture
//! Three layers, no globals:
//! - Screens (observable state holders over watch channels)
//! - Client (typed operations, error mapping)
//! - Transport (shared reqwest pool, timeouts, retry, logging)

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prefs;
pub mod screens;
pub mod source;

// Re-export commonly used types
pub use client::ApiClient;
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use models::{
    DownloadProgress, EntryKind, FilesystemEntry, ListSummary, RemoteFile, UploadedFile,
};
pub use prefs::{FilePreferences, MemoryPreferences, Preferences};
pub use screens::{
    FileSort, FilesScreen, FilesState, FilesystemScreen, FilesystemState, ListsScreen,
    ListsState, SettingsScreen, SettingsState, UploadScreen, UploadState,
};
pub use source::{BytesSource, ContentSource, FileSource, ResolvedContent};
