//! Asset handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};

use super::super::types::{
    DeleteFileRequest, FilesQuery, MessageResponse, RefreshQuery, RenameFileRequest,
    RenameFileResponse, UploadFileRequest, UploadFileResponse, required, resource_kind,
};
use super::super::{AppError, AppState};
use super::{json_body, query};
use crate::library::{AssetView, LibraryFileView};
use crate::remote::DestroyOutcome;

/// GET /api/cloudinary/files - Direct assets of `folder` (default: library root).
pub(crate) async fn list_files(
    State(state): State<AppState>,
    params: Result<Query<FilesQuery>, QueryRejection>,
) -> Result<Json<Vec<AssetView>>, AppError> {
    let params = query(params)?;
    let folder = params
        .folder
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(state.library.library_root());

    let files = state
        .library
        .list_folder_contents(folder, params.refresh)
        .await?;
    Ok(Json(files))
}

/// GET /api/cloudinary/all-files - Every asset below the library root.
pub(crate) async fn list_all_files(
    State(state): State<AppState>,
    params: Result<Query<RefreshQuery>, QueryRejection>,
) -> Result<Json<Vec<LibraryFileView>>, AppError> {
    let params = query(params)?;
    Ok(Json(state.library.list_all_files(params.refresh).await?))
}

/// GET /api/cloudinary/all-images - The newest images below the library root.
pub(crate) async fn list_all_images(
    State(state): State<AppState>,
    params: Result<Query<RefreshQuery>, QueryRejection>,
) -> Result<Json<Vec<LibraryFileView>>, AppError> {
    let params = query(params)?;
    Ok(Json(state.library.list_all_images(params.refresh).await?))
}

/// POST /api/cloudinary/upload - Store a new asset.
pub(crate) async fn upload_file(
    State(state): State<AppState>,
    body: Result<Json<UploadFileRequest>, JsonRejection>,
) -> Result<Json<UploadFileResponse>, AppError> {
    let req = json_body(body)?;
    let file = required(&req.file, "file")?;

    let asset = state
        .library
        .upload_file(file, req.folder.as_deref(), req.filename.as_deref())
        .await?;
    Ok(Json(asset.into()))
}

/// POST /api/cloudinary/rename - Rename one asset.
pub(crate) async fn rename_file(
    State(state): State<AppState>,
    body: Result<Json<RenameFileRequest>, JsonRejection>,
) -> Result<Json<RenameFileResponse>, AppError> {
    let req = json_body(body)?;
    let from = required(&req.from_public_id, "fromPublicId")?;
    let to = required(&req.to_public_id, "toPublicId")?;
    let kind = resource_kind(&req.resource_type)?;

    let renamed = state.library.rename_file(from, to, kind).await?;

    Ok(Json(RenameFileResponse {
        success: true,
        message: format!("Renamed '{from}' to '{}'", renamed.public_id),
        public_id: renamed.public_id,
        url: renamed.secure_url,
    }))
}

/// DELETE /api/cloudinary/delete - Delete one asset.
pub(crate) async fn delete_file(
    State(state): State<AppState>,
    body: Result<Json<DeleteFileRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let req = json_body(body)?;
    let id = required(&req.public_id, "publicId")?;
    let kind = resource_kind(&req.resource_type)?;

    let message = match state.library.delete_file(id, kind).await? {
        DestroyOutcome::Deleted => format!("Deleted '{id}'"),
        DestroyOutcome::NotFound => format!("'{id}' was already absent"),
    };
    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}
