//! Outcome of a subtree walk.

use serde::Serialize;
use std::fmt;

use crate::error::Error;

/// Remote step that failed for one item of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedStep {
    Search,
    ListSubfolders,
    DestroyAsset,
    RenameAsset,
    CreateFolder,
    DeleteFolder,
}

impl fmt::Display for FailedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Search => "search",
            Self::ListSubfolders => "list subfolders",
            Self::DestroyAsset => "destroy asset",
            Self::RenameAsset => "rename asset",
            Self::CreateFolder => "create folder",
            Self::DeleteFolder => "delete folder",
        })
    }
}

/// One absorbed failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    /// Asset id or folder path the step was applied to.
    pub target: String,
    pub step: FailedStep,
    pub message: String,
}

/// Counts and absorbed failures accumulated while walking a subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub assets_deleted: usize,
    pub assets_migrated: usize,
    /// Folders below the starting folder that were processed.
    pub subfolders_visited: usize,
    pub placeholders_created: usize,
    /// Ids found during discovery that no spelling of the source path owns.
    pub skipped: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl OperationReport {
    /// Returns true if any item failed without aborting the walk.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record(&mut self, target: impl Into<String>, step: FailedStep, error: &Error) {
        self.failures.push(ItemFailure {
            target: target.into(),
            step,
            message: error.to_string(),
        });
    }
}

/// Result of [`MediaLibrary::delete_subtree`](super::MediaLibrary::delete_subtree).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub success: bool,
    pub deleted_count: usize,
    pub partial: bool,
    pub report: OperationReport,
}

impl From<OperationReport> for DeleteOutcome {
    fn from(report: OperationReport) -> Self {
        Self {
            success: true,
            deleted_count: report.assets_deleted,
            partial: report.is_partial(),
            report,
        }
    }
}

/// Result of [`MediaLibrary::rename_subtree`](super::MediaLibrary::rename_subtree).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameOutcome {
    pub success: bool,
    pub migrated_count: usize,
    pub partial: bool,
    pub report: OperationReport,
}

impl From<OperationReport> for RenameOutcome {
    fn from(report: OperationReport) -> Self {
        Self {
            success: true,
            migrated_count: report.assets_migrated,
            partial: report.is_partial(),
            report,
        }
    }
}
