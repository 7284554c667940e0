//! Observable state cell shared by the screen holders

use std::sync::Arc;

use tokio::sync::watch;

/// Single-writer observable value. Holders publish snapshots; shells take
/// the current one or subscribe for changes. Works with zero receivers, so
/// a holder can run headless in tests.
#[derive(Clone)]
pub(crate) struct StateCell<S> {
    tx: Arc<watch::Sender<S>>,
}

impl<S: Clone> StateCell<S> {
    pub fn new(initial: S) -> Self {
        let (tx, _rx) = watch::channel(initial);
        StateCell { tx: Arc::new(tx) }
    }

    /// Current snapshot.
    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }

    /// Mutate the snapshot under the channel lock and notify observers.
    /// Concurrent updates serialize here; they never tear.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        self.tx.send_modify(f);
    }
}
