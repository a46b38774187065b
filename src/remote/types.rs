//! Types exchanged with the remote asset service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Storage class of an asset. Batch and single-item calls are per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
    Raw,
}

impl ResourceKind {
    /// Every kind, in the order fallback discovery walks them.
    pub const ALL: [ResourceKind; 3] = [Self::Image, Self::Video, Self::Raw];

    /// Wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "raw" => Ok(Self::Raw),
            other => Err(Error::invalid_argument(format!(
                "unknown resource type '{other}' (expected image, video or raw)"
            ))),
        }
    }
}

/// A stored media object, as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Remote-assigned opaque id.
    #[serde(default)]
    pub asset_id: String,
    /// Slash-delimited path id (e.g. "events/2024/poster").
    pub public_id: String,
    #[serde(rename = "resource_type")]
    pub kind: ResourceKind,
    #[serde(default)]
    pub format: String,
    /// Size in bytes
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub secure_url: String,
    /// Original file name, when the service reports one.
    #[serde(default, alias = "original_filename")]
    pub filename: Option<String>,
    /// Containing folder, when the service reports one.
    #[serde(default)]
    pub folder: Option<String>,
}

/// One page of a paginated enumeration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcePage {
    #[serde(default)]
    pub resources: Vec<Asset>,
    /// Present while more pages remain.
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A folder entry from a folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
    /// Number of assets below the folder, when the service reports it.
    #[serde(default)]
    pub files_count: Option<u64>,
}

/// A file to store in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Data URI (`data:<mime>;base64,...`) or a URL the service fetches.
    pub file: String,
    /// Destination folder.
    pub folder: String,
    /// Original file name. Its stem becomes the last segment of the id.
    pub filename: Option<String>,
}

impl UploadRequest {
    /// Media type declared by a data URI.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.file.strip_prefix("data:")?.split(',').next()?;
        header.split(';').next().filter(|m| !m.is_empty())
    }

    /// Storage class implied by the declared media type or the file name.
    pub fn detect_kind(&self) -> ResourceKind {
        if let Some(mime) = self.mime_type() {
            return match mime.split('/').next() {
                Some("image") => ResourceKind::Image,
                Some("video" | "audio") => ResourceKind::Video,
                _ => ResourceKind::Raw,
            };
        }
        let name = self.filename.as_deref().unwrap_or(&self.file);
        match extension(name).as_deref() {
            Some("jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" | "bmp" | "tiff" | "avif" | "heic") => {
                ResourceKind::Image
            },
            Some("mp4" | "mov" | "webm" | "mkv" | "avi" | "mp3" | "wav" | "ogg" | "m4a") => ResourceKind::Video,
            _ => ResourceKind::Raw,
        }
    }
}

/// Lowercased extension of the last path segment, ignoring any query.
pub(crate) fn extension(name: &str) -> Option<String> {
    let path = name.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Result of a single-asset rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedAsset {
    pub public_id: String,
    #[serde(default)]
    pub secure_url: String,
}

/// Per-id status reported by a batch delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionStatus {
    Deleted,
    NotFound,
    /// Anything else the service reported for the id.
    Other(String),
}

impl DeletionStatus {
    /// Parse the service's status string.
    pub fn parse(status: &str) -> Self {
        match status {
            "deleted" | "ok" => Self::Deleted,
            "not_found" | "not found" => Self::NotFound,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns true if the id is confirmed gone.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Deleted | Self::NotFound)
    }
}

/// Result of a batch delete call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDeleteResult {
    pub statuses: BTreeMap<String, DeletionStatus>,
}

impl BatchDeleteResult {
    /// Ids from `requested` that this result does not confirm as gone.
    ///
    /// Ids missing from the result count as unconfirmed.
    pub fn unconfirmed<'a>(&self, requested: &'a [String]) -> Vec<&'a String> {
        requested
            .iter()
            .filter(|id| !self.statuses.get(*id).is_some_and(DeletionStatus::is_gone))
            .collect()
    }

    /// Number of ids actually deleted by this call.
    pub fn deleted_count(&self) -> usize {
        self.statuses
            .values()
            .filter(|s| **s == DeletionStatus::Deleted)
            .count()
    }
}

/// Result of a single-asset delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!("image".parse::<ResourceKind>().unwrap(), ResourceKind::Image);
        assert_eq!(" Video ".parse::<ResourceKind>().unwrap(), ResourceKind::Video);
        assert_eq!("raw".parse::<ResourceKind>().unwrap(), ResourceKind::Raw);
        assert!("auto".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_asset_from_service_json() {
        let json = r#"{
            "asset_id": "b5e6d2b3",
            "public_id": "events/poster",
            "resource_type": "image",
            "format": "png",
            "bytes": 2048,
            "width": 640,
            "height": 480,
            "created_at": "2024-05-01T10:00:00Z",
            "secure_url": "https://res.example.com/events/poster.png"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.public_id, "events/poster");
        assert_eq!(asset.kind, ResourceKind::Image);
        assert_eq!(asset.width, Some(640));
        assert!(asset.filename.is_none());
    }

    #[test]
    fn test_raw_asset_without_dimensions() {
        let json = r#"{
            "public_id": "docs/agenda.pdf",
            "resource_type": "raw",
            "created_at": "2024-05-01T10:00:00Z"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.kind, ResourceKind::Raw);
        assert_eq!(asset.width, None);
        assert_eq!(asset.bytes, 0);
    }

    #[test]
    fn test_upload_response_filename() {
        let json = r#"{
            "public_id": "home/events/poster_x1",
            "resource_type": "image",
            "created_at": "2024-05-01T10:00:00Z",
            "original_filename": "poster"
        }"#;
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.filename.as_deref(), Some("poster"));
    }

    fn upload(file: &str, filename: Option<&str>) -> UploadRequest {
        UploadRequest {
            file: file.to_string(),
            folder: "home".to_string(),
            filename: filename.map(str::to_string),
        }
    }

    #[test]
    fn test_upload_kind_detection() {
        let png = upload("data:image/png;base64,iVBORw0KGgo=", None);
        assert_eq!(png.mime_type(), Some("image/png"));
        assert_eq!(png.detect_kind(), ResourceKind::Image);

        let pdf = upload("data:application/pdf;base64,JVBERi0=", Some("agenda.pdf"));
        assert_eq!(pdf.detect_kind(), ResourceKind::Raw);

        let clip = upload("https://cdn.example.com/clips/intro.MP4?v=2", None);
        assert_eq!(clip.mime_type(), None);
        assert_eq!(clip.detect_kind(), ResourceKind::Video);

        assert_eq!(upload("https://example.com/file", None).detect_kind(), ResourceKind::Raw);
        assert_eq!(extension(".hidden"), None);
    }

    #[test]
    fn test_unconfirmed_ids() {
        let mut result = BatchDeleteResult::default();
        result
            .statuses
            .insert("a".into(), DeletionStatus::parse("deleted"));
        result
            .statuses
            .insert("b".into(), DeletionStatus::parse("not_found"));
        result
            .statuses
            .insert("c".into(), DeletionStatus::parse("rate_limited"));

        let requested: Vec<String> = ["a", "b", "c", "d"].map(String::from).to_vec();
        let unconfirmed = result.unconfirmed(&requested);
        assert_eq!(unconfirmed, vec!["c", "d"]);
        assert_eq!(result.deleted_count(), 1);
    }
}
