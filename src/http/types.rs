//! Request and response types for the HTTP API.
//!
//! Field names are camelCase on the wire. Required body fields are modeled
//! as `Option` so a missing field is reported as a 400 with a readable message
//! instead of a deserialization rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AppError;
use crate::library::{FileType, ItemFailure, OperationReport};
use crate::paths::{last_segment, parent_folder};
use crate::remote::{Asset, ResourceKind};

/// Returns the trimmed field value, or a bad request naming the field.
pub(crate) fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{field} is required")))
}

/// Parses an optional `resourceType`, defaulting to image.
pub(crate) fn resource_kind(value: &Option<String>) -> Result<ResourceKind, AppError> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(kind) => Ok(kind.parse()?),
        None => Ok(ResourceKind::Image),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoldersQuery {
    pub parent: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesQuery {
    pub folder: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    /// Parent folder; empty creates a top-level folder.
    pub folder_path: Option<String>,
    pub folder_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderResponse {
    pub success: bool,
    pub message: String,
    pub folder_path: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFolderRequest {
    pub from_path: Option<String>,
    pub to_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderRequest {
    pub folder_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFolderResponse {
    pub success: bool,
    pub message: String,
    pub migrated_count: usize,
    pub partial: bool,
    pub failures: Vec<FailureBody>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFolderResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
    pub partial: bool,
    pub failures: Vec<FailureBody>,
}

/// Wire form of an [`ItemFailure`].
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureBody {
    pub target: String,
    pub step: String,
    pub message: String,
}

impl From<&ItemFailure> for FailureBody {
    fn from(failure: &ItemFailure) -> Self {
        Self {
            target: failure.target.clone(),
            step: failure.step.to_string(),
            message: failure.message.clone(),
        }
    }
}

pub(crate) fn failure_bodies(report: &OperationReport) -> Vec<FailureBody> {
    report.failures.iter().map(FailureBody::from).collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileRequest {
    pub from_public_id: Option<String>,
    pub to_public_id: Option<String>,
    pub resource_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameFileResponse {
    pub success: bool,
    pub message: String,
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    /// Data URI or URL of the file.
    pub file: Option<String>,
    pub folder: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileResponse {
    pub url: String,
    pub public_id: String,
    pub folder: String,
    pub original_name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub resource_type: ResourceKind,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl From<Asset> for UploadFileResponse {
    fn from(asset: Asset) -> Self {
        let folder = asset
            .folder
            .clone()
            .or_else(|| parent_folder(&asset.public_id).map(str::to_string))
            .unwrap_or_default();
        let original_name = asset
            .filename
            .clone()
            .unwrap_or_else(|| last_segment(&asset.public_id).to_string());
        Self {
            file_type: FileType::classify(asset.kind, &asset.format),
            url: asset.secure_url,
            public_id: asset.public_id,
            folder,
            original_name,
            format: asset.format,
            resource_type: asset.kind,
            uploaded_at: Utc::now(),
            width: asset.width,
            height: asset.height,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub public_id: Option<String>,
    pub resource_type: Option<String>,
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}
