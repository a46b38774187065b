//! Folder handlers.
//!
//! Listing folders, creating a folder, and the two recursive subtree
//! operations (rename and delete).

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::super::types::{
    CreateFolderRequest, CreateFolderResponse, DeleteFolderRequest, DeleteFolderResponse,
    FoldersQuery, RenameFolderRequest, RenameFolderResponse, failure_bodies, required,
};
use super::super::{AppError, AppState};
use super::{json_body, query};
use crate::library::FolderView;

/// GET /api/cloudinary/folders - Child folders of `parent`, or top-level folders.
pub(crate) async fn list_folders(
    State(state): State<AppState>,
    params: Result<Query<FoldersQuery>, QueryRejection>,
) -> Result<Json<Vec<FolderView>>, AppError> {
    let params = query(params)?;
    let folders = state
        .library
        .list_folders(params.parent.as_deref(), params.refresh)
        .await?;
    Ok(Json(folders))
}

/// POST /api/cloudinary/create-folder - Create `folderName` below `folderPath`.
pub(crate) async fn create_folder(
    State(state): State<AppState>,
    body: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> Result<Json<CreateFolderResponse>, AppError> {
    let req = json_body(body)?;
    let name = required(&req.folder_name, "folderName")?;

    let folder_path = state
        .library
        .create_folder(req.folder_path.as_deref(), name)
        .await?;

    Ok(Json(CreateFolderResponse {
        success: true,
        message: format!("Folder '{folder_path}' created"),
        folder_path,
    }))
}

/// POST /api/cloudinary/rename-folder - Move a folder subtree.
pub(crate) async fn rename_folder(
    State(state): State<AppState>,
    body: Result<Json<RenameFolderRequest>, JsonRejection>,
) -> Result<Json<RenameFolderResponse>, AppError> {
    let req = json_body(body)?;
    let from = required(&req.from_path, "fromPath")?;
    let to = required(&req.to_path, "toPath")?;

    let outcome = state.library.rename_subtree(from, to).await?;
    let message = if outcome.partial {
        format!(
            "Renamed '{from}' to '{to}' with {} failure(s)",
            outcome.report.failures.len()
        )
    } else {
        format!("Renamed '{from}' to '{to}'")
    };

    Ok(Json(RenameFolderResponse {
        success: outcome.success,
        message,
        migrated_count: outcome.migrated_count,
        partial: outcome.partial,
        failures: failure_bodies(&outcome.report),
    }))
}

/// DELETE /api/cloudinary/delete-folder - Delete a folder subtree.
pub(crate) async fn delete_folder(
    State(state): State<AppState>,
    body: Result<Json<DeleteFolderRequest>, JsonRejection>,
) -> Result<Json<DeleteFolderResponse>, AppError> {
    let req = json_body(body)?;
    let path = required(&req.folder_path, "folderPath")?;

    let outcome = state.library.delete_subtree(path).await?;

    Ok(Json(DeleteFolderResponse {
        success: outcome.success,
        message: format!("Deleted '{path}' ({} assets)", outcome.deleted_count),
        deleted_count: outcome.deleted_count,
        partial: outcome.partial,
        failures: failure_bodies(&outcome.report),
    }))
}
