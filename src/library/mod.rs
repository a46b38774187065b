//! Folder-tree operations over a remote asset service.
//!
//! [`MediaLibrary`] ties an [`AssetService`], a [`ResponseCache`] and the
//! path addressing rules together. Reads are served from the cache when
//! possible; every mutation clears it, whether the mutation succeeded or not.

mod catalog;
mod delete;
mod rename;
mod report;


pub use catalog::{AssetView, FileType, FolderView, LibraryFileView};
pub use report::{DeleteOutcome, FailedStep, ItemFailure, OperationReport, RenameOutcome};

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::ResponseCache;
use crate::config::{BackendKind, Config};
use crate::constants::{ALL_IMAGES_LIMIT, MAX_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::paths::{RootAlias, is_strict_child, join, normalize_folder, validate_segment};
use crate::reliability::RetryConfig;
use crate::remote::{
    Asset, AssetBackend, AssetService, CloudinaryBackend, DestroyOutcome, MemoryAssetBackend,
    RenamedAsset, ResourceKind, UploadRequest,
};

/// Media library facade used by the HTTP layer and the CLI.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    service: AssetService,
    cache: ResponseCache,
    alias: RootAlias,
    library_root: String,
    batch_size: usize,
    delete_concurrency: usize,
}

impl MediaLibrary {
    /// Creates a library with default walk settings.
    pub fn new(service: AssetService, cache: ResponseCache) -> Self {
        Self {
            service,
            cache,
            alias: RootAlias::default(),
            library_root: crate::constants::DEFAULT_LIBRARY_ROOT.to_string(),
            batch_size: MAX_BATCH_SIZE,
            delete_concurrency: 1,
        }
    }

    /// Builds the library described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the selected backend cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Arc<dyn AssetBackend> = match config.remote.backend {
            BackendKind::Cloudinary => Arc::new(CloudinaryBackend::new(&config.remote)?),
            BackendKind::Memory => Arc::new(MemoryAssetBackend::new()),
        };
        let service = AssetService::from_arc(backend)
            .with_retry(RetryConfig::from(&config.retry))
            .with_page_size(config.walk.search_page_size);

        Ok(Self::new(service, ResponseCache::with_ttl(config.cache.ttl()))
            .with_alias(RootAlias::new(config.remote.root_alias.as_str()))
            .with_library_root(&config.remote.library_root)
            .with_batch_size(config.walk.batch_size)
            .with_delete_concurrency(config.walk.delete_concurrency))
    }

    #[must_use]
    pub fn with_alias(mut self, alias: RootAlias) -> Self {
        self.alias = alias;
        self
    }

    #[must_use]
    pub fn with_library_root(mut self, root: &str) -> Self {
        self.library_root = root.trim_matches('/').to_string();
        self
    }

    /// Ids per batch delete call, clamped to `1..=MAX_BATCH_SIZE`.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Batch delete calls in flight at once within one folder (at least 1).
    #[must_use]
    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.delete_concurrency = concurrency.max(1);
        self
    }

    pub fn service(&self) -> &AssetService {
        &self.service
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn library_root(&self) -> &str {
        &self.library_root
    }

    /// Deletes `folder_path`, every asset and folder below it, and the same
    /// assets stored under the root-aliased spelling.
    ///
    /// Deleting a folder that does not exist succeeds and deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a malformed path. Failures to
    /// remove a folder itself are returned after everything below it has
    /// been processed. All other per-item failures are recorded in the
    /// report.
    pub async fn delete_subtree(&self, folder_path: &str) -> Result<DeleteOutcome> {
        let path = normalize_folder(folder_path)?;
        info!(path = %path, "Deleting folder subtree");

        let result = delete::run(self, &path).await;
        self.invalidate();

        let report = result?;
        info!(
            path = %path,
            deleted = report.assets_deleted,
            subfolders = report.subfolders_visited,
            failures = report.failures.len(),
            "Folder subtree deleted"
        );
        Ok(report.into())
    }

    /// Moves every asset below `from_path` to the same relative id below
    /// `to_path`, preserving empty folders, then removes the source folders.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for malformed paths, identical
    /// paths, or a destination inside the source. Per-asset failures are
    /// reported through [`RenameOutcome::partial`].
    pub async fn rename_subtree(&self, from_path: &str, to_path: &str) -> Result<RenameOutcome> {
        let from = normalize_folder(from_path)?;
        let to = normalize_folder(to_path)?;
        if from == to {
            return Err(Error::invalid_argument(format!(
                "source and destination are the same folder: {from}"
            )));
        }
        if is_strict_child(&to, &from) {
            return Err(Error::invalid_argument(format!(
                "cannot move {from} into its own subfolder {to}"
            )));
        }

        info!(from = %from, to = %to, "Renaming folder subtree");
        let report = rename::run(self, &from, &to).await;
        self.invalidate();

        if report.is_partial() {
            warn!(
                from = %from,
                to = %to,
                failures = report.failures.len(),
                "Folder subtree renamed with failures"
            );
        } else {
            info!(
                from = %from,
                to = %to,
                migrated = report.assets_migrated,
                "Folder subtree renamed"
            );
        }
        Ok(report.into())
    }

    /// Creates the folder `name` below `parent`, or at the top level.
    pub async fn create_folder(&self, parent: Option<&str>, name: &str) -> Result<String> {
        let name = validate_segment(name)?;
        let path = match parent.map(str::trim).filter(|p| !p.is_empty()) {
            Some(parent) => join(&normalize_folder(parent)?, name),
            None => name.to_string(),
        };

        let result = self.service.create_folder(&path).await;
        self.invalidate();
        let created = result?;
        info!(path = %created, "Folder created");
        Ok(created)
    }

    /// Uploads `file` (a data URI or URL) into `folder`.
    ///
    /// Folders outside the library root are placed below it, and no folder
    /// means the library root itself, so every upload shows up in
    /// [`list_all_files`](Self::list_all_files).
    pub async fn upload_file(
        &self,
        file: &str,
        folder: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Asset> {
        let file = file.trim();
        if file.is_empty() {
            return Err(Error::invalid_argument("file is required"));
        }
        let filename = match filename.map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) if name.contains('/') => {
                return Err(Error::invalid_argument(format!(
                    "filename cannot contain '/': {name}"
                )));
            },
            other => other.map(str::to_string),
        };
        let request = UploadRequest {
            file: file.to_string(),
            folder: self.upload_folder(folder)?,
            filename,
        };

        let result = self.service.upload_asset(&request).await;
        self.invalidate();
        let asset = result?;
        info!(public_id = %asset.public_id, folder = %request.folder, "Asset uploaded");
        Ok(asset)
    }

    fn upload_folder(&self, folder: Option<&str>) -> Result<String> {
        let Some(folder) = folder.map(str::trim).filter(|f| !f.is_empty()) else {
            return Ok(self.library_root.clone());
        };
        let folder = normalize_folder(folder)?;
        if folder == self.library_root || is_strict_child(&folder, &self.library_root) {
            Ok(folder)
        } else {
            Ok(join(&self.library_root, &folder))
        }
    }

    /// Renames one asset.
    pub async fn rename_file(
        &self,
        from_id: &str,
        to_id: &str,
        kind: ResourceKind,
    ) -> Result<RenamedAsset> {
        let from = from_id.trim();
        let to = to_id.trim();
        if from.is_empty() || to.is_empty() {
            return Err(Error::invalid_argument("asset ids cannot be empty"));
        }

        let result = self.service.rename_asset(from, to, kind).await;
        self.invalidate();
        let renamed = result?;
        info!(from, to = %renamed.public_id, "Asset renamed");
        Ok(renamed)
    }

    /// Deletes one asset. An asset that is already absent counts as deleted.
    pub async fn delete_file(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::invalid_argument("asset id cannot be empty"));
        }

        let result = self.service.destroy_asset(id, kind).await;
        self.invalidate();
        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_not_found() => Ok(DestroyOutcome::NotFound),
            Err(e) => Err(e),
        }
    }

    /// Direct assets of `folder_path`.
    pub async fn list_folder_contents(
        &self,
        folder_path: &str,
        force_refresh: bool,
    ) -> Result<Vec<AssetView>> {
        let path = normalize_folder(folder_path)?;
        let key = catalog::files_key(&path);
        if !force_refresh && let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let mut assets = self.service.collect_folder(&path).await?;
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let views: Vec<AssetView> = assets.into_iter().map(AssetView::from).collect();
        self.cache.set(&key, &views, None);
        Ok(views)
    }

    /// Direct child folders of `parent`, or the top-level folders.
    pub async fn list_folders(
        &self,
        parent: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<FolderView>> {
        let parent = match parent.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Some(normalize_folder(p)?),
            None => None,
        };
        let key = catalog::folders_key(parent.as_deref());
        if !force_refresh && let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let entries = match &parent {
            Some(p) => self.service.subfolders_or_empty(p).await?,
            None => self.service.list_root_folders().await?,
        };
        let views: Vec<FolderView> = entries.into_iter().map(FolderView::from).collect();
        self.cache.set(&key, &views, None);
        Ok(views)
    }

    /// Every asset below the library root, newest first.
    pub async fn list_all_files(&self, force_refresh: bool) -> Result<Vec<LibraryFileView>> {
        if !force_refresh && let Some(hit) = self.cache.get(catalog::ALL_FILES_KEY) {
            return Ok(hit);
        }

        let assets = self.service.collect_all(&self.library_root).await?;
        let views: Vec<LibraryFileView> = assets
            .into_iter()
            .map(|asset| LibraryFileView::new(asset, &self.library_root))
            .collect();
        self.cache.set(catalog::ALL_FILES_KEY, &views, None);
        Ok(views)
    }

    /// The newest images below the library root.
    pub async fn list_all_images(&self, force_refresh: bool) -> Result<Vec<LibraryFileView>> {
        if !force_refresh && let Some(hit) = self.cache.get(catalog::ALL_IMAGES_KEY) {
            return Ok(hit);
        }

        let views: Vec<LibraryFileView> = self
            .list_all_files(force_refresh)
            .await?
            .into_iter()
            .filter(|file| file.resource_kind == ResourceKind::Image)
            .take(ALL_IMAGES_LIMIT)
            .collect();
        self.cache.set(catalog::ALL_IMAGES_KEY, &views, None);
        Ok(views)
    }

    fn invalidate(&self) {
        self.cache.clear();
    }
}
