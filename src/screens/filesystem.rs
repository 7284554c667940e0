//! Remote filesystem browser holder
//!
//! Navigation is path based: the holder only ever knows the current path
//! and its children, fetched level by level. The root of every account's
//! tree is the service-defined path `me`.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::config::FILESYSTEM_ROOT;
use crate::models::FilesystemEntry;
use crate::prefs::{stored_api_key, Preferences};
use crate::screens::StateCell;

/// Snapshot of the filesystem screen.
#[derive(Clone, Debug)]
pub struct FilesystemState {
    pub path: String,
    /// Children of `path` in listing order.
    pub entries: Vec<FilesystemEntry>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for FilesystemState {
    fn default() -> Self {
        FilesystemState {
            path: FILESYSTEM_ROOT.to_string(),
            entries: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Holder for the filesystem screen. Dropping it aborts in-flight fetches.
/// Overlapping navigations are not fenced; the last completion wins.
pub struct FilesystemScreen {
    client: ApiClient,
    prefs: Arc<dyn Preferences>,
    state: StateCell<FilesystemState>,
    tasks: JoinSet<()>,
}

impl FilesystemScreen {
    pub fn new(client: ApiClient, prefs: Arc<dyn Preferences>) -> Self {
        FilesystemScreen {
            client,
            prefs,
            state: StateCell::new(FilesystemState::default()),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> FilesystemState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<FilesystemState> {
        self.state.subscribe()
    }

    /// Wait until every spawned task has settled. For tests and shells
    /// that need a deterministic flush point.
    pub async fn wait_idle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    /// Load the children of `path`. Blank input falls back to the root.
    pub fn open(&mut self, path: impl Into<String>) {
        let path = normalize_path(&path.into());
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();

        state.update(|s| {
            s.path = path.clone();
            s.loading = true;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client.filesystem_path(&api_key, &path).await;
            state.update(|s| {
                s.loading = false;
                match result {
                    Ok(entries) => s.entries = entries,
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }

    /// Reload the current path.
    pub fn refresh(&mut self) {
        let path = self.state.get().path;
        self.open(path);
    }

    /// Enter a child directory. Files never navigate; what opening a file
    /// means is the shell's business.
    pub fn navigate_to_child(&mut self, entry: &FilesystemEntry) {
        if entry.is_dir() {
            self.open(entry.path.clone());
        }
    }

    /// Go up one level. No-op at the root.
    pub fn navigate_up(&mut self) {
        let current = self.state.get().path;
        if let Some(parent) = parent_path(&current) {
            self.open(parent);
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        FILESYSTEM_ROOT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parent of a path, or None at the root level.
fn parent_path(path: &str) -> Option<String> {
    let trimmed = path.trim_matches('/');
    let (parent, _leaf) = trimmed.rsplit_once('/')?;
    Some(parent.to_string())
}
