//! Screen state holders - one observable state machine per screen
//!
//! Each holder owns its snapshot behind a watch channel plus a task set
//! scoped to the screen: dropping the holder aborts whatever it had in
//! flight. Holders do not fence overlapping requests; when two fetches
//! race, the last one to finish wins.

mod cell;
pub mod files;
pub mod filesystem;
pub mod lists;
pub mod settings;
pub mod upload;

pub(crate) use cell::StateCell;

pub use files::{FileSort, FilesScreen, FilesState};
pub use filesystem::{FilesystemScreen, FilesystemState};
pub use lists::{ListsScreen, ListsState};
pub use settings::{SettingsScreen, SettingsState};
pub use upload::{UploadScreen, UploadState};
