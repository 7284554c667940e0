//! Shared lists holder

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::client::ApiClient;
use crate::models::ListSummary;
use crate::prefs::{stored_api_key, Preferences};
use crate::screens::StateCell;

/// Snapshot of the lists screen.
#[derive(Clone, Debug, Default)]
pub struct ListsState {
    pub loading: bool,
    pub lists: Vec<ListSummary>,
    pub error: Option<String>,
}

/// Holder for the lists screen. Dropping it aborts an in-flight fetch.
pub struct ListsScreen {
    client: ApiClient,
    prefs: Arc<dyn Preferences>,
    state: StateCell<ListsState>,
    tasks: JoinSet<()>,
}

impl ListsScreen {
    pub fn new(client: ApiClient, prefs: Arc<dyn Preferences>) -> Self {
        ListsScreen {
            client,
            prefs,
            state: StateCell::new(ListsState::default()),
            tasks: JoinSet::new(),
        }
    }

    pub fn state(&self) -> ListsState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListsState> {
        self.state.subscribe()
    }

    /// Wait until every spawned task has settled. For tests and shells
    /// that need a deterministic flush point.
    pub async fn wait_idle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }

    /// Fetch the account's shared lists.
    pub fn fetch_lists(&mut self) {
        let client = self.client.clone();
        let api_key = stored_api_key(self.prefs.as_ref());
        let state = self.state.clone();

        state.update(|s| {
            s.loading = true;
            s.error = None;
        });

        self.tasks.spawn(async move {
            let result = client.user_lists(&api_key).await;
            state.update(|s| {
                s.loading = false;
                match result {
                    Ok(lists) => s.lists = lists,
                    Err(e) => s.error = Some(e.user_message()),
                }
            });
        });
    }
}
