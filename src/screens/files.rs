//! File list and file detail holder
//!
//! One holder serves both the account file list and the single-file detail
//! view; they share the same screen in every shell shipped so far. File
//! snapshots are immutable, so every change (delete included) goes through
//! a fresh fetch rather than local mutation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::models::{DownloadProgress, RemoteFile};
use crate::prefs::{stored_api_key, Preferences};
use crate::screens::StateCell;

/// Sort orders the shell can offer for the file list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FileSort {
    #[default]
    NewestFirst,
    OldestFirst,
    NameAsc,
    NameDesc,
    LargestFirst,
    SmallestFirst,
}

impl FileSort {
    fn compare(&self, a: &RemoteFile, b: &RemoteFile) -> Ordering {
        match self {
            FileSort::NewestFirst => b.date_upload.cmp(&a.date_upload),
            FileSort::OldestFirst => a.date_upload.cmp(&b.date_upload),
            FileSort::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            FileSort::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
            FileSort::LargestFirst => b.size.cmp(&a.size),
            FileSort::SmallestFirst => a.size.cmp(&b.size),
        }
    }
}

/// Snapshot of the files screen.
#[derive(Clone, Debug, Default)]
pub struct FilesState {
    pub loading: bool,
    /// Account files exactly as the service returned them.
    pub files: Vec<RemoteFile>,
    /// Single file opened in the detail view.
    pub detail: Option<RemoteFile>,
    pub error: Option<String>,
    pub query: String,
    pub sort: FileSort,
    /// Delete waits here for an explicit confirm.
    pub pending_delete: Option<String>,
    /// Download waits here for an explicit confirm.
    pub pending_download: Option<String>,
    /// Active downloads keyed by file id; entries drain when a transfer
    /// settles.
    pub downloads: HashMap<String, DownloadProgress>,
}

impl FilesState {
    /// Files matching the query, in the selected order. The raw `files`
    /// vector stays untouched so clearing the query costs nothing.
    pub fn visible_files(&self) -> Vec<&RemoteFile> {
        let needle = self.query.trim().to_lowercase();
        let mut visible: Vec<&RemoteFile> = self
            .files
            .iter()
            .filter(|f| needle.is_empty() || f.name.to_lowercase().contains(&needle))
            .collect();
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

/// Holder for the files screen. Dropping it aborts in-flight fetches and
/// downloads. Overlapping fetches are not fenced; the last completion wins.
pub struct FilesScreen {
    client: ApiClient,
    prefs: Arc<dyn Preferences>,
    state: StateCell<FilesState>,
    tasks: JoinSet<()>,
}

impl FilesScreen {
    pub fn new(client: ApiClient, prefs: Arc<dyn Preferences>) -> Self {
        FilesScreen {
            client,
            prefs,
            state: StateCell::new(FilesState::default()),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> FilesState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilesState> {
        self.state.subscribe()
    }

    /// Wait until every spawned task has settled. For tests and shells
    /// that need a deterministic flush point.
    pub async fn wait_idle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    // ========================
    // Fetching
    // ========================

    /// Fetch the account's files. Requires a stored API key; the error
    /// lands in state without a network round trip when there is none.
    pub fn fetch_user_files(&mut self) {
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();

        state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client.user_files(&api_key).await;
            state.update(|s| {
                s.loading = false;
                match result {
                    Ok(files) => s.files = files,
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }

    /// Fetch one file's details into the detail slot.
    pub fn fetch_file_info(&mut self, file_id: impl Into<String>) {
        let file_id = file_id.into();
        let client = self.client.clone();
        let state = self.state.clone();

        state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client.file_info(&file_id).await;
            state.update(|s| {
                s.loading = false;
                match result {
                    Ok(file) => s.detail = Some(file),
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }

    // ========================
    // Query and sort
    // ========================

    pub fn set_query(&self, query: impl Into<String>) {
        self.state.update(|s| s.query = query.into());
    }

    pub fn set_sort(&self, sort: FileSort) {
        self.state.update(|s| s.sort = sort);
    }

    // ========================
    // Two-step delete
    // ========================

    pub fn initiate_delete(&self, file_id: impl Into<String>) {
        self.state.update(|s| s.pending_delete = Some(file_id.into()));
    }

    pub fn cancel_delete(&self) {
        self.state.update(|s| s.pending_delete = None);
    }

    /// Delete the pending file, then re-fetch the list so the snapshot
    /// reflects the service again. No-op when nothing is pending.
    pub fn confirm_delete(&mut self) {
        let Some(file_id) = self.state.get().pending_delete else {
            return;
        };
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();

        state.update(|s| {
            s.pending_delete = None;
            s.loading = true;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = match client.delete_file(&api_key, &file_id).await {
                Ok(()) => client.user_files(&api_key).await,
                Err(e) => Err(e),
            };
            state.update(|s| {
                s.loading = false;
                match result {
                    Ok(files) => {
                        s.files = files;
                        if s.detail.as_ref().is_some_and(|d| d.id == file_id) {
                            s.detail = None;
                        }
                    }
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }

    // ========================
    // Two-step download
    // ========================

    pub fn initiate_download(&self, file_id: impl Into<String>) {
        self.state
            .update(|s| s.pending_download = Some(file_id.into()));
    }

    pub fn cancel_download(&self) {
        self.state.update(|s| s.pending_download = None);
    }

    /// Stream the pending file to `dest`, publishing progress through the
    /// downloads map. No-op when nothing is pending.
    pub fn confirm_download(&mut self, dest: PathBuf) {
        let Some(file_id) = self.state.get().pending_download else {
            return;
        };
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();

        state.update(|s| {
            s.pending_download = None;
            s.error = None;
            s.downloads
                .insert(file_id.clone(), DownloadProgress::default());
        });

        self.tasks.spawn(async move {
            let progress_state = state.clone();
            let progress_id = file_id.clone();
            let result = client
                .download_file(&api_key, &file_id, &dest, move |progress| {
                    progress_state.update(|s| {
                        s.downloads.insert(progress_id.clone(), progress);
                    });
                })
                .await;

            state.update(|s| {
                s.downloads.remove(&file_id);
                if let Err(e) = result {
                    s.error = Some(e.user_message());
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, name: &str, size: u64, uploaded: &str) -> RemoteFile {
        RemoteFile {
            id: id.into(),
            name: name.into(),
            size,
            views: 0,
            downloads: 0,
            bandwidth_used: 0,
            date_upload: uploaded.parse().unwrap(),
            date_last_view: None,
            mime_type: None,
            thumbnail_href: None,
            hash_sha256: None,
            can_edit: false,
            delete_after_date: None,
            delete_after_downloads: None,
            availability: None,
            availability_message: None,
            abuse_type: None,
            abuse_reporter_name: None,
            can_download: true,
            show_ads: false,
            allow_video_player: true,
            download_speed_limit: 0,
        }
    }

    fn sample_state() -> FilesState {
        FilesState {
            files: vec![
                file("1", "beta.txt", 10, "2024-01-01T00:00:00Z"),
                file("2", "Alpha.txt", 30, "2024-03-01T00:00:00Z"),
                file("3", "gamma.bin", 20, "2024-02-01T00:00:00Z"),
            ],
            ..FilesState::default()
        }
    }

    #[test]
    fn test_visible_files_default_newest_first() {
        let state = sample_state();
        let ids: Vec<&str> = state.visible_files().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn test_visible_files_query_is_case_insensitive() {
        let mut state = sample_state();
        state.query = "ALPHA".into();
        let names: Vec<&str> = state
            .visible_files()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha.txt"]);
    }

    #[test]
    fn test_visible_files_sort_by_name_ignores_case() {
        let mut state = sample_state();
        state.sort = FileSort::NameAsc;
        let names: Vec<&str> = state
            .visible_files()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha.txt", "beta.txt", "gamma.bin"]);
    }

    #[test]
    fn test_visible_files_sort_by_size() {
        let mut state = sample_state();
        state.sort = FileSort::LargestFirst;
        let sizes: Vec<u64> = state.visible_files().iter().map(|f| f.size).collect();
        assert_eq!(sizes, [30, 20, 10]);
    }

    #[test]
    fn test_sort_orders_are_exact_reverses() {
        let a = file("1", "a", 1, "2024-01-01T00:00:00Z");
        let b = file("2", "b", 2, "2024-02-01T00:00:00Z");
        assert_eq!(
            FileSort::NewestFirst.compare(&a, &b),
            FileSort::OldestFirst.compare(&b, &a)
        );
        assert_eq!(
            FileSort::LargestFirst.compare(&a, &b),
            FileSort::SmallestFirst.compare(&b, &a)
        );
    }
}
