//! Upload screen holder

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::models::UploadedFile;
use crate::prefs::{stored_api_key, Preferences};
use crate::screens::StateCell;
use crate::source::ContentSource;

/// Snapshot of the upload screen.
#[derive(Clone, Debug, Default)]
pub struct UploadState {
    /// Name the file will carry on the service, typed by the user.
    pub file_name: String,
    pub uploading: bool,
    pub uploaded: Option<UploadedFile>,
    pub error: Option<String>,
}

/// Holder for the upload screen. Dropping it aborts an in-flight upload.
/// Overlapping intents are not fenced; the last completion wins.
pub struct UploadScreen {
    client: ApiClient,
    prefs: Arc<dyn Preferences>,
    state: StateCell<UploadState>,
    tasks: JoinSet<()>,
}

impl UploadScreen {
    pub fn new(client: ApiClient, prefs: Arc<dyn Preferences>) -> Self {
        UploadScreen {
            client,
            prefs,
            state: StateCell::new(UploadState::default()),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> UploadState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.subscribe()
    }

    /// Wait until every spawned task has settled. For tests and shells
    /// that need a deterministic flush point.
    pub async fn wait_idle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    pub fn set_file_name(&self, name: impl Into<String>) {
        self.state.update(|s| s.file_name = name.into());
    }

    /// Forget the last outcome, keeping the typed-in name.
    pub fn clear_result(&self) {
        self.state.update(|s| {
            s.uploaded = None;
            s.error = None;
        });
    }

    /// Upload raw bytes under the current file name. A blank name fails
    /// before anything touches the network.
    pub fn upload_bytes(&mut self, bytes: Vec<u8>) {
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();
        let file_name = self.state.get().file_name;

        state.update(|s| {
            s.uploading = true;
            s.uploaded = None;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client.upload_bytes(&api_key, &file_name, bytes).await;
            state.update(|s| {
                s.uploading = false;
                match result {
                    Ok(uploaded) => s.uploaded = Some(uploaded),
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }

    /// Upload whatever the source resolves to, named by the typed-in name
    /// or the source's own name hint when the field is blank.
    pub fn upload_source(&mut self, source: Arc<dyn ContentSource>) {
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();
        let file_name = self.state.get().file_name;

        state.update(|s| {
            s.uploading = true;
            s.uploaded = None;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client
                .upload_source(&api_key, &file_name, source.as_ref())
                .await;
            state.update(|s| {
                s.uploading = false;
                match result {
                    Ok(uploaded) => s.uploaded = Some(uploaded),
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }
}
