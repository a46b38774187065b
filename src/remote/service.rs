//! Retrying, exhaustively paging front for an [`AssetBackend`].

use super::backend::AssetBackend;
use super::memory::MemoryAssetBackend;
use super::types::{
    Asset, BatchDeleteResult, DestroyOutcome, FolderEntry, RenamedAsset, ResourceKind, ResourcePage,
    UploadRequest,
};
use crate::constants::DEFAULT_SEARCH_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::reliability::{RetryConfig, retry_remote, retry_remote_when};
use std::sync::Arc;
use tracing::debug;

/// Asset service wrapping a backend with retry and pagination.
///
/// Every call retries transient failures according to its [`RetryConfig`].
/// The `collect_*` helpers follow cursors until exhaustion.
#[derive(Clone)]
pub struct AssetService {
    backend: Arc<dyn AssetBackend>,
    retry: RetryConfig,
    page_size: usize,
}

impl std::fmt::Debug for AssetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetService")
            .field("retry", &self.retry)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl AssetService {
    /// Creates a service over a fresh in-memory backend.
    pub fn memory() -> Self {
        Self::custom(MemoryAssetBackend::new())
    }

    /// Creates a service over a custom backend.
    pub fn custom<B: AssetBackend>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Creates a service over an already shared backend.
    pub fn from_arc(backend: Arc<dyn AssetBackend>) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
            page_size: DEFAULT_SEARCH_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Page size for paginated enumerations. Zero is treated as one.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &Arc<dyn AssetBackend> {
        &self.backend
    }

    pub async fn search_by_folder(&self, folder: &str, cursor: Option<&str>) -> Result<ResourcePage> {
        retry_remote(&self.retry, "search_by_folder", || {
            self.backend.search_by_folder(folder, cursor, self.page_size)
        })
        .await
    }

    pub async fn search_all(&self, root: &str, cursor: Option<&str>) -> Result<ResourcePage> {
        retry_remote(&self.retry, "search_all", || {
            self.backend.search_all(root, cursor, self.page_size)
        })
        .await
    }

    pub async fn list_resources_by_prefix(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
    ) -> Result<ResourcePage> {
        retry_remote(&self.retry, "list_resources_by_prefix", || {
            self.backend
                .list_resources_by_prefix(prefix, kind, cursor, self.page_size)
        })
        .await
    }

    pub async fn list_root_folders(&self) -> Result<Vec<FolderEntry>> {
        retry_remote(&self.retry, "list_root_folders", || {
            self.backend.list_root_folders()
        })
        .await
    }

    pub async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderEntry>> {
        retry_remote(&self.retry, "list_subfolders", || {
            self.backend.list_subfolders(path)
        })
        .await
    }

    /// Lists direct child folders, treating a missing folder as having none.
    pub async fn subfolders_or_empty(&self, path: &str) -> Result<Vec<FolderEntry>> {
        match self.list_subfolders(path).await {
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            other => other,
        }
    }

    pub async fn create_folder(&self, path: &str) -> Result<String> {
        retry_remote(&self.retry, "create_folder", || self.backend.create_folder(path)).await
    }

    pub async fn delete_folder(&self, path: &str) -> Result<()> {
        retry_remote(&self.retry, "delete_folder", || self.backend.delete_folder(path)).await
    }

    /// Stores a new asset. Retried only on rate-limit rejections, like renames.
    pub async fn upload_asset(&self, request: &UploadRequest) -> Result<Asset> {
        retry_remote_when(&self.retry, "upload_asset", Error::is_rate_limited, || {
            self.backend.upload_asset(request)
        })
        .await
    }

    /// Renames one asset. Only rate-limit rejections are retried, since a
    /// timed out rename may already have been applied.
    pub async fn rename_asset(
        &self,
        from_id: &str,
        to_id: &str,
        kind: ResourceKind,
    ) -> Result<RenamedAsset> {
        retry_remote_when(&self.retry, "rename_asset", Error::is_rate_limited, || {
            self.backend.rename_asset(from_id, to_id, kind)
        })
        .await
    }

    pub async fn delete_assets_batch(
        &self,
        ids: &[String],
        kind: ResourceKind,
    ) -> Result<BatchDeleteResult> {
        retry_remote(&self.retry, "delete_assets_batch", || {
            self.backend.delete_assets_batch(ids, kind)
        })
        .await
    }

    pub async fn destroy_asset(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome> {
        retry_remote(&self.retry, "destroy_asset", || {
            self.backend.destroy_asset(id, kind)
        })
        .await
    }

    /// Every direct asset of `folder`, across all pages.
    pub async fn collect_folder(&self, folder: &str) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.search_by_folder(folder, cursor.as_deref()).await?;
            debug!(folder, count = page.resources.len(), "Fetched search page");
            assets.extend(page.resources);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(assets),
            }
        }
    }

    /// Every asset of `kind` whose id starts with `prefix`, across all pages.
    pub async fn collect_prefix(&self, prefix: &str, kind: ResourceKind) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self
                .list_resources_by_prefix(prefix, kind, cursor.as_deref())
                .await?;
            debug!(prefix, %kind, count = page.resources.len(), "Fetched prefix page");
            assets.extend(page.resources);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(assets),
            }
        }
    }

    /// Every asset below `root`, newest first, across all pages.
    pub async fn collect_all(&self, root: &str) -> Result<Vec<Asset>> {
        let mut assets = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.search_all(root, cursor.as_deref()).await?;
            assets.extend(page.resources);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(assets),
            }
        }
    }
}
