//! Client-facing listing views and their cache keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::paths::{last_segment, parent_folder};
use crate::remote::{Asset, FolderEntry, ResourceKind};

pub(super) const ALL_FILES_KEY: &str = "all_files";
pub(super) const ALL_IMAGES_KEY: &str = "all_images";

pub(super) fn files_key(folder: &str) -> String {
    format!("files_{folder}")
}

pub(super) fn folders_key(parent: Option<&str>) -> String {
    match parent {
        Some(parent) => format!("folders_path_{parent}"),
        None => "folders_root".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderView {
    pub name: String,
    pub path: String,
    pub files_count: u64,
}

impl From<FolderEntry> for FolderView {
    fn from(entry: FolderEntry) -> Self {
        Self {
            name: entry.name,
            path: entry.path,
            files_count: entry.files_count.unwrap_or(0),
        }
    }
}

/// One asset in a folder listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    /// Remote-assigned asset id.
    pub id: String,
    pub name: String,
    pub public_id: String,
    pub url: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Size in bytes
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub resource_kind: ResourceKind,
}

impl From<Asset> for AssetView {
    fn from(asset: Asset) -> Self {
        let name = asset
            .filename
            .clone()
            .unwrap_or_else(|| last_segment(&asset.public_id).to_string());
        Self {
            id: asset.asset_id,
            name,
            public_id: asset.public_id,
            url: asset.secure_url,
            format: asset.format,
            width: asset.width,
            height: asset.height,
            size: asset.bytes,
            created_at: asset.created_at,
            resource_kind: asset.kind,
        }
    }
}

/// Coarse document class shown in the aggregate file view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Image,
    Video,
    Pdf,
    Document,
    Spreadsheet,
    Presentation,
}

impl FileType {
    pub fn classify(kind: ResourceKind, format: &str) -> Self {
        match kind {
            ResourceKind::Image if !format.eq_ignore_ascii_case("pdf") => Self::Image,
            ResourceKind::Video => Self::Video,
            _ => match format.to_ascii_lowercase().as_str() {
                "pdf" => Self::Pdf,
                "xls" | "xlsx" | "xlsm" | "csv" => Self::Spreadsheet,
                "ppt" | "pptx" => Self::Presentation,
                _ => Self::Document,
            },
        }
    }
}

/// One asset in the aggregate view of the whole library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFileView {
    pub id: String,
    pub name: String,
    pub public_id: String,
    pub url: String,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub resource_kind: ResourceKind,
    pub file_type: FileType,
    /// Containing folder.
    pub folder: String,
    /// Top-level section below the library root.
    pub section: String,
}

impl LibraryFileView {
    pub(super) fn new(asset: Asset, library_root: &str) -> Self {
        let folder = asset
            .folder
            .clone()
            .or_else(|| parent_folder(&asset.public_id).map(str::to_string))
            .unwrap_or_else(|| library_root.to_string());
        let section = asset
            .public_id
            .split('/')
            .nth(1)
            .filter(|_| asset.public_id.matches('/').count() > 1)
            .unwrap_or(library_root)
            .to_string();

        Self {
            id: asset.public_id.clone(),
            name: last_segment(&asset.public_id).to_string(),
            file_type: FileType::classify(asset.kind, &asset.format),
            public_id: asset.public_id,
            url: asset.secure_url,
            format: asset.format,
            width: asset.width,
            height: asset.height,
            size: asset.bytes,
            created_at: asset.created_at,
            resource_kind: asset.kind,
            folder,
            section,
        }
    }
}
