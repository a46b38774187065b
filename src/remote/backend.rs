//! Backend trait for the remote asset service.
//!
//! Defines the operation set the orchestrators program against. The remote
//! service owns all folder-tree state; implementations translate these calls
//! into its API.

use super::types::{
    Asset, BatchDeleteResult, DestroyOutcome, FolderEntry, RenamedAsset, ResourceKind,
    ResourcePage, UploadRequest,
};
use crate::error::Result;
use async_trait::async_trait;

/// Backend trait for a remote asset service.
///
/// All backends must be thread-safe (`Send + Sync`) for use with tokio.
/// Every call is independent: one failing call says nothing about its
/// siblings.
///
/// # Example
///
/// ```ignore
/// use mediafold::remote::{AssetBackend, MemoryAssetBackend, ResourceKind};
///
/// let backend = MemoryAssetBackend::new();
/// backend.upload("events/poster", ResourceKind::Image);
/// let page = backend.search_by_folder("events", None, 500).await?;
/// assert_eq!(page.resources.len(), 1);
/// ```
#[async_trait]
pub trait AssetBackend: Send + Sync + 'static {
    /// Lists the direct contents of a folder, all kinds mixed.
    ///
    /// Follow `next_cursor` until it is absent to enumerate exhaustively.
    /// Backed by the service's search index, which may lag recent writes.
    async fn search_by_folder(
        &self,
        folder: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage>;

    /// Lists every asset below `root`, newest first.
    async fn search_all(
        &self,
        root: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage>;

    /// Lists assets of one kind whose id starts with `prefix`.
    ///
    /// Independent of the search index and usually consistent with writes
    /// sooner.
    async fn list_resources_by_prefix(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage>;

    /// Lists top-level folders.
    async fn list_root_folders(&self) -> Result<Vec<FolderEntry>>;

    /// Lists the direct child folders of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) when the folder
    /// does not exist.
    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderEntry>>;

    /// Ensures a folder exists even with zero assets. Returns its path.
    async fn create_folder(&self, path: &str) -> Result<String>;

    /// Deletes an empty folder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) when the folder is
    /// already gone, or a remote error when it still holds assets.
    async fn delete_folder(&self, path: &str) -> Result<()>;

    /// Stores a new asset below `request.folder`.
    ///
    /// The service picks the final id. It never replaces an existing asset.
    async fn upload_asset(&self, request: &UploadRequest) -> Result<Asset>;

    /// Renames one asset. Fails without side effects if `to_id` is taken.
    async fn rename_asset(
        &self,
        from_id: &str,
        to_id: &str,
        kind: ResourceKind,
    ) -> Result<RenamedAsset>;

    /// Deletes up to [`MAX_BATCH_SIZE`](crate::constants::MAX_BATCH_SIZE)
    /// assets of one kind in a single call.
    async fn delete_assets_batch(
        &self,
        ids: &[String],
        kind: ResourceKind,
    ) -> Result<BatchDeleteResult>;

    /// Deletes a single asset.
    async fn destroy_asset(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome>;
}

