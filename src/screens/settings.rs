//! Settings screen holder
//!
//! The only setting today is the account API key. This holder is purely
//! synchronous: its backing store is the preferences file, not the network.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::PREF_API_KEY;
use crate::prefs::{stored_api_key, Preferences};
use crate::screens::StateCell;

/// Snapshot of the settings screen.
#[derive(Clone, Debug, Default)]
pub struct SettingsState {
    /// Key as typed, not yet necessarily persisted.
    pub api_key: String,
    /// True once the typed key matches the store.
    pub saved: bool,
    pub error: Option<String>,
}

/// Holder for the settings screen.
pub struct SettingsScreen {
    prefs: Arc<dyn Preferences>,
    state: StateCell<SettingsState>,
}

impl SettingsScreen {
    /// Starts from whatever key is already stored.
    pub fn new(prefs: Arc<dyn Preferences>) -> Self {
        let api_key = stored_api_key(prefs.as_ref());
        let saved = !api_key.is_empty();
        SettingsScreen {
            prefs,
            state: StateCell::new(SettingsState {
                api_key,
                saved,
                error: None,
            }),
        }
    }

    pub fn state(&self) -> SettingsState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<SettingsState> {
        self.state.subscribe()
    }

    pub fn set_api_key(&self, key: impl Into<String>) {
        self.state.update(|s| {
            s.api_key = key.into();
            s.saved = false;
            s.error = None;
        });
    }

    /// Persist the trimmed key. Saving an all-whitespace key unlinks the
    /// account by removing the entry.
    pub fn save(&self) {
        let key = self.state.get().api_key.trim().to_string();
        let result = if key.is_empty() {
            self.prefs.remove(PREF_API_KEY)
        } else {
            self.prefs.set(PREF_API_KEY, &key)
        };

        match result {
            Ok(()) => {
                tracing::info!(linked = !key.is_empty(), "API key saved");
                self.state.update(|s| {
                    s.api_key = key;
                    s.saved = true;
                    s.error = None;
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist API key");
                self.state.update(|s| {
                    s.saved = false;
                    s.error = Some(format!("Could not save settings: {:#}", e));
                });
            }
        }
    }
}
