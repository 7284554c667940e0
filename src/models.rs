use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

fn default_true() -> bool {
    true
}

/// A file stored on the service, as the info and listing endpoints return it.
///
/// Snapshots are immutable on this side: the service owns mutation and
/// changes become visible on the next fetch. Unknown wire fields are
/// ignored so the service can grow without breaking deployed clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub bandwidth_used: u64,
    pub date_upload: DateTime<Utc>,
    #[serde(default)]
    pub date_last_view: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub thumbnail_href: Option<String>,
    #[serde(default)]
    pub hash_sha256: Option<String>,
    #[serde(default)]
    pub can_edit: bool,
    /// Absent unless the uploader set an expiry date.
    #[serde(default)]
    pub delete_after_date: Option<DateTime<Utc>>,
    /// Absent unless the uploader capped the download count.
    #[serde(default)]
    pub delete_after_downloads: Option<u64>,
    /// Empty or absent while the file is served normally.
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub availability_message: Option<String>,
    #[serde(default)]
    pub abuse_type: Option<String>,
    #[serde(default)]
    pub abuse_reporter_name: Option<String>,
    #[serde(default = "default_true")]
    pub can_download: bool,
    #[serde(default)]
    pub show_ads: bool,
    #[serde(default = "default_true")]
    pub allow_video_player: bool,
    /// Bytes per second, 0 meaning unthrottled.
    #[serde(default)]
    pub download_speed_limit: u64,
}

impl RemoteFile {
    /// False once moderation or expiry has pulled the file.
    pub fn is_available(&self) -> bool {
        self.availability.as_deref().map_or(true, |a| a.is_empty())
    }

    pub fn size_display(&self) -> String {
        human_size(self.size)
    }
}

/// Success payload of an upload. The service assigns the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
}

/// Kind of a filesystem entry on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One child of a remote filesystem directory. Listings are fetched per
/// path; the client never materializes the whole tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilesystemEntry {
    /// Present for entries backed by a hosted file, absent for bare dirs.
    #[serde(default)]
    pub id: Option<String>,
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub modified: DateTime<Utc>,
}

impl FilesystemEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Listing order for one directory level: directories group before files,
/// newest modification first within each group, case-insensitive name as
/// the final tiebreaker.
pub fn listing_order(a: &FilesystemEntry, b: &FilesystemEntry) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| b.modified.cmp(&a.modified))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// A shared list (album) owned by the account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    pub id: String,
    pub title: String,
    pub date_created: DateTime<Utc>,
    #[serde(default)]
    pub file_count: Option<u64>,
}

/// Progress of one streaming download.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    pub received: u64,
    /// From Content-Length when the service sent one.
    pub total: Option<u64>,
}

impl DownloadProgress {
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.received as f64 / total as f64),
            _ => None,
        }
    }
}

/// Render a byte count in binary units, one decimal above KiB.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(name: &str, kind: EntryKind, modified: &str) -> FilesystemEntry {
        FilesystemEntry {
            id: None,
            path: format!("me/{}", name),
            name: name.to_string(),
            kind,
            size: 0,
            mime_type: None,
            modified: modified.parse().unwrap(),
        }
    }

    #[test]
    fn test_remote_file_round_trip_full() {
        let file = RemoteFile {
            id: "abc123XY".into(),
            name: "report.pdf".into(),
            size: 48_213,
            views: 7,
            downloads: 3,
            bandwidth_used: 144_639,
            date_upload: Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap(),
            date_last_view: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            mime_type: Some("application/pdf".into()),
            thumbnail_href: Some("/file/abc123XY/thumbnail".into()),
            hash_sha256: Some("e3b0c44298fc1c149afbf4c8996fb924".into()),
            can_edit: true,
            delete_after_date: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            delete_after_downloads: Some(100),
            availability: Some(String::new()),
            availability_message: None,
            abuse_type: None,
            abuse_reporter_name: None,
            can_download: true,
            show_ads: false,
            allow_video_player: true,
            download_speed_limit: 0,
        };
        let json = serde_json::to_string(&file).unwrap();
        let back: RemoteFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);
    }

    #[test]
    fn test_remote_file_ignores_unknown_fields() {
        let json = r#"{
            "id": "k9",
            "name": "clip.mp4",
            "size": 12,
            "date_upload": "2024-03-02T08:00:00Z",
            "brand_new_server_field": {"nested": true}
        }"#;
        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.id, "k9");
        assert!(file.can_download);
        assert_eq!(file.delete_after_date, None);
    }

    fn file_with_size(size: u64) -> RemoteFile {
        let json = format!(
            r#"{{"id": "a1", "name": "clip.mp4", "size": {}, "date_upload": "2024-03-02T08:00:00Z"}}"#,
            size
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_is_available_empty_or_absent_means_served() {
        let mut file = file_with_size(12);
        assert!(file.is_available());

        file.availability = Some(String::new());
        assert!(file.is_available());

        file.availability = Some("abuse_takedown".into());
        assert!(!file.is_available());
    }

    #[test]
    fn test_size_display_renders_binary_units() {
        assert_eq!(file_with_size(512).size_display(), "512 B");
        assert_eq!(file_with_size(2048).size_display(), "2.0 KiB");
    }

    #[test]
    fn test_listing_order_groups_dirs_first() {
        let dir = entry("zeta", EntryKind::Dir, "2020-01-01T00:00:00Z");
        let file = entry("alpha", EntryKind::File, "2024-01-01T00:00:00Z");
        assert_eq!(listing_order(&dir, &file), Ordering::Less);
    }

    #[test]
    fn test_listing_order_newest_first_within_group() {
        let old = entry("old", EntryKind::File, "2023-01-01T00:00:00Z");
        let new = entry("new", EntryKind::File, "2024-01-01T00:00:00Z");
        assert_eq!(listing_order(&new, &old), Ordering::Less);
    }

    #[test]
    fn test_listing_order_name_tiebreak_ignores_case() {
        let a = entry("Beta", EntryKind::File, "2024-01-01T00:00:00Z");
        let b = entry("alpha", EntryKind::File, "2024-01-01T00:00:00Z");
        assert_eq!(listing_order(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_entry_kind_wire_names() {
        let dir: EntryKind = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(dir, EntryKind::Dir);
        assert_eq!(serde_json::to_string(&EntryKind::File).unwrap(), "\"file\"");
    }

    #[test]
    fn test_human_size_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MiB");
    }

    #[test]
    fn test_download_progress_fraction() {
        let progress = DownloadProgress {
            received: 50,
            total: Some(200),
        };
        assert_eq!(progress.fraction(), Some(0.25));
        assert_eq!(DownloadProgress::default().fraction(), None);
    }
}
