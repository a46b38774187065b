//! In-memory asset backend.
//!
//! Models the remote service's folder semantics without a network: folders
//! are derived from asset ids plus explicit placeholders, the search index
//! can be made to lag behind writes, and individual operations can be made
//! to fail. Used by tests and by `remote.backend = "memory"` for local
//! development.

use super::backend::AssetBackend;
use super::types::{
    Asset, BatchDeleteResult, DeletionStatus, DestroyOutcome, FolderEntry, RenamedAsset,
    ResourceKind, ResourcePage, UploadRequest, extension,
};
use crate::constants::MAX_BATCH_SIZE;
use crate::error::{Error, Result};
use crate::paths::{child_folders, is_strict_child, join, last_segment, parent_folder};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Identity of an asset: id plus kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AssetKey {
    public_id: String,
    kind: ResourceKind,
}

impl AssetKey {
    fn new(public_id: &str, kind: ResourceKind) -> Self {
        Self {
            public_id: public_id.to_string(),
            kind,
        }
    }
}

#[derive(Clone)]
struct StoredAsset {
    asset: Asset,
    /// Visible to `search_*` calls.
    indexed: bool,
}

/// Number of calls made per operation.
#[derive(Debug, Default)]
struct CallCounters {
    search: AtomicUsize,
    prefix_list: AtomicUsize,
    subfolder_list: AtomicUsize,
    create_folder: AtomicUsize,
    delete_folder: AtomicUsize,
    upload: AtomicUsize,
    rename: AtomicUsize,
    batch_delete: AtomicUsize,
    destroy: AtomicUsize,
}

/// Snapshot of [`MemoryAssetBackend`] call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub search: usize,
    pub prefix_list: usize,
    pub subfolder_list: usize,
    pub create_folder: usize,
    pub delete_folder: usize,
    pub upload: usize,
    pub rename: usize,
    pub batch_delete: usize,
    pub destroy: usize,
}

#[derive(Default)]
struct Inner {
    assets: DashMap<AssetKey, StoredAsset>,
    placeholders: DashSet<String>,
    index_lag: AtomicBool,
    fail_batch_deletes: AtomicBool,
    fail_renames: DashSet<String>,
    lost_rename_responses: DashSet<String>,
    fail_deletes: DashSet<String>,
    fail_folder_deletes: DashSet<String>,
    next_asset_id: AtomicU64,
    calls: CallCounters,
}

/// In-memory asset service using DashMap.
///
/// `MemoryAssetBackend` is `Clone`; clones share state, so a test can keep a
/// handle for assertions after handing one to an [`AssetService`].
///
/// [`AssetService`]: super::AssetService
///
/// # Example
///
/// ```
/// use mediafold::remote::{MemoryAssetBackend, ResourceKind};
///
/// let backend = MemoryAssetBackend::new();
/// backend.create_placeholder("a/b");
/// backend.upload("a/b/img1", ResourceKind::Image);
/// assert!(backend.folder_exists("a/b"));
/// assert!(backend.contains("a/b/img1", ResourceKind::Image));
/// ```
#[derive(Clone, Default)]
pub struct MemoryAssetBackend {
    inner: Arc<Inner>,
}

impl MemoryAssetBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an asset with a small default size.
    pub fn upload(&self, public_id: &str, kind: ResourceKind) -> Asset {
        self.upload_with_size(public_id, kind, 1024)
    }

    /// Stores an asset whose reported folder differs from its id's path, as
    /// services with decoupled display folders do.
    pub fn upload_in_folder(&self, public_id: &str, kind: ResourceKind, folder: &str) -> Asset {
        let mut asset = self.upload(public_id, kind);
        asset.folder = Some(folder.to_string());
        if let Some(mut stored) = self.inner.assets.get_mut(&AssetKey::new(public_id, kind)) {
            stored.asset.folder = asset.folder.clone();
        }
        asset
    }

    /// Stores an asset of `bytes` bytes, replacing any asset with that identity.
    pub fn upload_with_size(&self, public_id: &str, kind: ResourceKind, bytes: u64) -> Asset {
        let n = self.inner.next_asset_id.fetch_add(1, Ordering::Relaxed);
        let asset = Asset {
            asset_id: format!("{n:016x}"),
            public_id: public_id.to_string(),
            kind,
            format: default_format(kind).to_string(),
            bytes,
            width: (kind != ResourceKind::Raw).then_some(640),
            height: (kind != ResourceKind::Raw).then_some(480),
            created_at: Utc::now(),
            secure_url: secure_url(public_id, kind),
            filename: Some(last_segment(public_id).to_string()),
            folder: parent_folder(public_id).map(str::to_string),
        };
        let indexed = !self.inner.index_lag.load(Ordering::SeqCst);
        self.inner.assets.insert(
            AssetKey::new(public_id, kind),
            StoredAsset {
                asset: asset.clone(),
                indexed,
            },
        );
        asset
    }

    /// Marks a folder as existing without any asset in it.
    pub fn create_placeholder(&self, path: &str) {
        self.inner.placeholders.insert(path.to_string());
    }

    /// While enabled, new uploads are invisible to search until [`sync_index`].
    ///
    /// [`sync_index`]: Self::sync_index
    pub fn set_index_lag(&self, lagging: bool) {
        self.inner.index_lag.store(lagging, Ordering::SeqCst);
    }

    /// Makes every stored asset visible to search.
    pub fn sync_index(&self) {
        for mut entry in self.inner.assets.iter_mut() {
            entry.indexed = true;
        }
    }

    /// Makes every batch delete call fail as a whole.
    pub fn fail_batch_deletes(&self, fail: bool) {
        self.inner.fail_batch_deletes.store(fail, Ordering::SeqCst);
    }

    /// Makes renames of `public_id` fail.
    pub fn fail_rename_of(&self, public_id: &str) {
        self.inner.fail_renames.insert(public_id.to_string());
    }

    /// Applies the next rename of `public_id` but reports it as unavailable,
    /// as if the response was lost.
    pub fn lose_rename_response_of(&self, public_id: &str) {
        self.inner.lost_rename_responses.insert(public_id.to_string());
    }

    /// Makes batch and single deletes of `public_id` fail.
    pub fn fail_delete_of(&self, public_id: &str) {
        self.inner.fail_deletes.insert(public_id.to_string());
    }

    /// Makes deleting the folder at `path` fail with a service error.
    pub fn fail_folder_delete_of(&self, path: &str) {
        self.inner.fail_folder_deletes.insert(path.to_string());
    }

    /// Returns true if an asset with this identity exists.
    pub fn contains(&self, public_id: &str, kind: ResourceKind) -> bool {
        self.inner
            .assets
            .contains_key(&AssetKey::new(public_id, kind))
    }

    /// Every stored asset id, sorted.
    pub fn asset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .inner
            .assets
            .iter()
            .map(|entry| entry.key().public_id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of stored assets.
    pub fn len(&self) -> usize {
        self.inner.assets.len()
    }

    /// Returns true if no asset is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.assets.is_empty()
    }

    /// Returns true if the derived folder view contains `path`.
    pub fn folder_exists(&self, path: &str) -> bool {
        self.inner.placeholders.contains(path)
            || self
                .inner
                .placeholders
                .iter()
                .any(|p| is_strict_child(p.key(), path))
            || self
                .inner
                .assets
                .iter()
                .any(|entry| is_strict_child(&entry.key().public_id, path))
    }

    /// Number of assets anywhere below `path`.
    pub fn files_below(&self, path: &str) -> u64 {
        self.inner
            .assets
            .iter()
            .filter(|entry| is_strict_child(&entry.key().public_id, path))
            .count() as u64
    }

    /// Current call counts.
    pub fn calls(&self) -> CallCounts {
        let c = &self.inner.calls;
        CallCounts {
            search: c.search.load(Ordering::Relaxed),
            prefix_list: c.prefix_list.load(Ordering::Relaxed),
            subfolder_list: c.subfolder_list.load(Ordering::Relaxed),
            create_folder: c.create_folder.load(Ordering::Relaxed),
            delete_folder: c.delete_folder.load(Ordering::Relaxed),
            upload: c.upload.load(Ordering::Relaxed),
            rename: c.rename.load(Ordering::Relaxed),
            batch_delete: c.batch_delete.load(Ordering::Relaxed),
            destroy: c.destroy.load(Ordering::Relaxed),
        }
    }

    fn collect_sorted<F>(&self, filter: F) -> Vec<Asset>
    where
        F: Fn(&AssetKey, &StoredAsset) -> bool,
    {
        let mut assets: Vec<Asset> = self
            .inner
            .assets
            .iter()
            .filter(|entry| filter(entry.key(), entry.value()))
            .map(|entry| entry.value().asset.clone())
            .collect();
        assets.sort_by(|a, b| a.public_id.cmp(&b.public_id).then(a.kind.cmp(&b.kind)));
        assets
    }

    fn folder_entries(&self, parent: Option<&str>) -> Vec<FolderEntry> {
        let ids = self
            .inner
            .assets
            .iter()
            .map(|entry| entry.key().public_id.clone())
            .collect::<Vec<_>>();
        let placeholders = self
            .inner
            .placeholders
            .iter()
            .map(|p| p.key().clone())
            .collect::<Vec<_>>();

        // Asset ids contribute only their folders; placeholders are folders.
        let mut children = child_folders(ids.iter().map(String::as_str), parent, false);
        children.extend(child_folders(
            placeholders.iter().map(String::as_str),
            parent,
            true,
        ));

        children
            .into_iter()
            .map(|path| FolderEntry {
                name: last_segment(&path).to_string(),
                files_count: Some(self.files_below(&path)),
                path,
            })
            .collect()
    }

    fn remove_if_deletable(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome> {
        if self.inner.fail_deletes.contains(id) {
            return Err(Error::RemoteUnavailable(format!("injected delete failure for {id}")));
        }
        Ok(match self.inner.assets.remove(&AssetKey::new(id, kind)) {
            Some(_) => DestroyOutcome::Deleted,
            None => DestroyOutcome::NotFound,
        })
    }
}

fn default_format(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Image => "png",
        ResourceKind::Video => "mp4",
        ResourceKind::Raw => "pdf",
    }
}

fn file_stem(name: &str) -> &str {
    let name = last_segment(name);
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

fn secure_url(public_id: &str, kind: ResourceKind) -> String {
    format!("https://media.invalid/{kind}/upload/{public_id}")
}

fn page_of(sorted: Vec<Asset>, cursor: Option<&str>, max_results: usize) -> ResourcePage {
    let start = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
    let end = start.saturating_add(max_results.max(1)).min(sorted.len());
    let next_cursor = (end < sorted.len()).then(|| end.to_string());
    let resources = sorted
        .into_iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect();
    ResourcePage {
        resources,
        next_cursor,
    }
}

#[async_trait]
impl AssetBackend for MemoryAssetBackend {
    async fn search_by_folder(
        &self,
        folder: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        self.inner.calls.search.fetch_add(1, Ordering::Relaxed);
        let assets = self.collect_sorted(|_, stored| {
            stored.indexed && stored.asset.folder.as_deref() == Some(folder)
        });
        Ok(page_of(assets, cursor, max_results))
    }

    async fn search_all(
        &self,
        root: &str,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        self.inner.calls.search.fetch_add(1, Ordering::Relaxed);
        let mut assets =
            self.collect_sorted(|key, stored| stored.indexed && is_strict_child(&key.public_id, root));
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(assets, cursor, max_results))
    }

    async fn list_resources_by_prefix(
        &self,
        prefix: &str,
        kind: ResourceKind,
        cursor: Option<&str>,
        max_results: usize,
    ) -> Result<ResourcePage> {
        self.inner.calls.prefix_list.fetch_add(1, Ordering::Relaxed);
        let assets =
            self.collect_sorted(|key, _| key.kind == kind && key.public_id.starts_with(prefix));
        Ok(page_of(assets, cursor, max_results))
    }

    async fn list_root_folders(&self) -> Result<Vec<FolderEntry>> {
        self.inner.calls.subfolder_list.fetch_add(1, Ordering::Relaxed);
        Ok(self.folder_entries(None))
    }

    async fn list_subfolders(&self, path: &str) -> Result<Vec<FolderEntry>> {
        self.inner.calls.subfolder_list.fetch_add(1, Ordering::Relaxed);
        if !self.folder_exists(path) {
            return Err(Error::not_found(format!("folder {path}")));
        }
        Ok(self.folder_entries(Some(path)))
    }

    async fn create_folder(&self, path: &str) -> Result<String> {
        self.inner.calls.create_folder.fetch_add(1, Ordering::Relaxed);
        self.inner.placeholders.insert(path.to_string());
        Ok(path.to_string())
    }

    async fn delete_folder(&self, path: &str) -> Result<()> {
        self.inner.calls.delete_folder.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_folder_deletes.contains(path) {
            return Err(Error::RemoteUnavailable(format!(
                "injected folder delete failure for {path}"
            )));
        }
        if !self.folder_exists(path) {
            return Err(Error::not_found(format!("folder {path}")));
        }
        if self.files_below(path) > 0 {
            return Err(Error::remote(400, format!("folder is not empty: {path}")));
        }
        self.inner
            .placeholders
            .retain(|p| p != path && !is_strict_child(p, path));
        Ok(())
    }

    async fn upload_asset(&self, request: &UploadRequest) -> Result<Asset> {
        self.inner.calls.upload.fetch_add(1, Ordering::Relaxed);
        let kind = request.detect_kind();
        let stem = request
            .filename
            .as_deref()
            .map(file_stem)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let name = stem.clone().unwrap_or_else(|| {
            let n = self.inner.next_asset_id.load(Ordering::Relaxed);
            format!("upload_{n:x}")
        });

        let base = join(&request.folder, &name);
        let mut public_id = base.clone();
        let mut suffix = 1;
        while self.contains(&public_id, kind) {
            public_id = format!("{base}_{suffix}");
            suffix += 1;
        }

        let bytes = match request.file.split_once(',') {
            Some((_, data)) if request.mime_type().is_some() => data.len() * 3 / 4,
            _ => request.file.len(),
        };
        let format = request
            .filename
            .as_deref()
            .and_then(extension)
            .or_else(|| {
                request
                    .mime_type()
                    .and_then(|m| m.split('/').nth(1))
                    .map(str::to_string)
            });

        let mut asset = self.upload_with_size(&public_id, kind, bytes as u64);
        if let Some(format) = format {
            asset.format = format;
        }
        asset.filename = stem;
        if let Some(mut stored) = self.inner.assets.get_mut(&AssetKey::new(&public_id, kind)) {
            stored.asset.format = asset.format.clone();
            stored.asset.filename = asset.filename.clone();
        }
        Ok(asset)
    }

    async fn rename_asset(
        &self,
        from_id: &str,
        to_id: &str,
        kind: ResourceKind,
    ) -> Result<RenamedAsset> {
        self.inner.calls.rename.fetch_add(1, Ordering::Relaxed);
        if self.inner.fail_renames.contains(from_id) {
            return Err(Error::remote(400, format!("injected rename failure for {from_id}")));
        }
        let target = AssetKey::new(to_id, kind);
        if self.inner.assets.contains_key(&target) {
            return Err(Error::remote(400, format!("{to_id} already exists")));
        }
        let (_, mut stored) = self
            .inner
            .assets
            .remove(&AssetKey::new(from_id, kind))
            .ok_or_else(|| Error::not_found(format!("{kind} {from_id}")))?;

        stored.asset.public_id = to_id.to_string();
        stored.asset.secure_url = secure_url(to_id, kind);
        stored.asset.folder = parent_folder(to_id).map(str::to_string);
        let renamed = RenamedAsset {
            public_id: to_id.to_string(),
            secure_url: stored.asset.secure_url.clone(),
        };
        self.inner.assets.insert(target, stored);
        if self.inner.lost_rename_responses.remove(from_id).is_some() {
            return Err(Error::RemoteUnavailable(format!("response lost for rename of {from_id}")));
        }
        Ok(renamed)
    }

    async fn delete_assets_batch(
        &self,
        ids: &[String],
        kind: ResourceKind,
    ) -> Result<BatchDeleteResult> {
        self.inner.calls.batch_delete.fetch_add(1, Ordering::Relaxed);
        if ids.len() > MAX_BATCH_SIZE {
            return Err(Error::invalid_argument(format!(
                "batch of {} ids exceeds the limit of {MAX_BATCH_SIZE}",
                ids.len()
            )));
        }
        if self.inner.fail_batch_deletes.load(Ordering::SeqCst) {
            return Err(Error::RemoteUnavailable("injected batch delete failure".into()));
        }

        let mut statuses = BTreeMap::new();
        for id in ids {
            let status = match self.remove_if_deletable(id, kind) {
                Ok(DestroyOutcome::Deleted) => DeletionStatus::Deleted,
                Ok(DestroyOutcome::NotFound) => DeletionStatus::NotFound,
                Err(_) => DeletionStatus::Other("error".to_string()),
            };
            statuses.insert(id.clone(), status);
        }
        Ok(BatchDeleteResult { statuses })
    }

    async fn destroy_asset(&self, id: &str, kind: ResourceKind) -> Result<DestroyOutcome> {
        self.inner.calls.destroy.fetch_add(1, Ordering::Relaxed);
        self.remove_if_deletable(id, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_returns_direct_contents_only() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/one", ResourceKind::Image);
        backend.upload("a/b/two", ResourceKind::Image);
        backend.upload("a_suffix/three", ResourceKind::Image);

        let page = backend.search_by_folder("a", None, 500).await.unwrap();
        let ids: Vec<_> = page.resources.iter().map(|a| a.public_id.as_str()).collect();
        assert_eq!(ids, vec!["a/one"]);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_search_matches_reported_folder() {
        let backend = MemoryAssetBackend::new();
        backend.upload_in_folder("home/a/x", ResourceKind::Image, "a");

        let page = backend.search_by_folder("a", None, 500).await.unwrap();
        assert_eq!(page.resources[0].public_id, "home/a/x");
        let page = backend.search_by_folder("home/a", None, 500).await.unwrap();
        assert!(page.resources.is_empty());
    }

    #[tokio::test]
    async fn test_search_paginates() {
        let backend = MemoryAssetBackend::new();
        for i in 0..5 {
            backend.upload(&format!("a/img{i}"), ResourceKind::Image);
        }

        let first = backend.search_by_folder("a", None, 2).await.unwrap();
        assert_eq!(first.resources.len(), 2);
        let cursor = first.next_cursor.unwrap();

        let second = backend
            .search_by_folder("a", Some(&cursor), 2)
            .await
            .unwrap();
        assert_eq!(second.resources.len(), 2);

        let third = backend
            .search_by_folder("a", second.next_cursor.as_deref(), 2)
            .await
            .unwrap();
        assert_eq!(third.resources.len(), 1);
        assert!(third.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_index_lag_hides_from_search_not_prefix_listing() {
        let backend = MemoryAssetBackend::new();
        backend.set_index_lag(true);
        backend.upload("a/fresh", ResourceKind::Video);

        let page = backend.search_by_folder("a", None, 500).await.unwrap();
        assert!(page.resources.is_empty());

        let listed = backend
            .list_resources_by_prefix("a/", ResourceKind::Video, None, 500)
            .await
            .unwrap();
        assert_eq!(listed.resources.len(), 1);

        backend.sync_index();
        let page = backend.search_by_folder("a", None, 500).await.unwrap();
        assert_eq!(page.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_subfolders_are_derived() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/b/x", ResourceKind::Image);
        backend.upload("a/b/y", ResourceKind::Image);
        backend.create_placeholder("a/empty");
        backend.upload("a/top", ResourceKind::Image);

        let subs = backend.list_subfolders("a").await.unwrap();
        let paths: Vec<_> = subs.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b", "a/empty"]);
        assert_eq!(subs[0].files_count, Some(2));
        assert_eq!(subs[1].files_count, Some(0));

        let roots = backend.list_root_folders().await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].name, "a");

        assert!(backend.list_subfolders("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_folder_requires_empty() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/x", ResourceKind::Image);

        let err = backend.delete_folder("a").await.unwrap_err();
        assert!(!err.is_not_found());

        backend.destroy_asset("a/x", ResourceKind::Image).await.unwrap();
        assert!(backend.delete_folder("a").await.unwrap_err().is_not_found());

        backend.create_placeholder("p/q");
        backend.delete_folder("p").await.unwrap();
        assert!(!backend.folder_exists("p/q"));
    }

    #[tokio::test]
    async fn test_rename_collision_leaves_both() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/x", ResourceKind::Image);
        backend.upload("b/x", ResourceKind::Image);

        let err = backend
            .rename_asset("a/x", "b/x", ResourceKind::Image)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert!(backend.contains("a/x", ResourceKind::Image));
        assert!(backend.contains("b/x", ResourceKind::Image));
    }

    #[tokio::test]
    async fn test_same_id_different_kind_are_distinct() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/clip", ResourceKind::Image);
        backend.upload("a/clip", ResourceKind::Video);
        assert_eq!(backend.len(), 2);

        backend
            .destroy_asset("a/clip", ResourceKind::Video)
            .await
            .unwrap();
        assert!(backend.contains("a/clip", ResourceKind::Image));
        assert!(!backend.contains("a/clip", ResourceKind::Video));
    }

    #[tokio::test]
    async fn test_batch_limit_enforced() {
        let backend = MemoryAssetBackend::new();
        let ids: Vec<String> = (0..=MAX_BATCH_SIZE).map(|i| format!("a/{i}")).collect();
        let err = backend
            .delete_assets_batch(&ids, ResourceKind::Image)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_batch_reports_per_id_status() {
        let backend = MemoryAssetBackend::new();
        backend.upload("a/ok", ResourceKind::Image);
        backend.upload("a/stuck", ResourceKind::Image);
        backend.fail_delete_of("a/stuck");

        let ids: Vec<String> = ["a/ok", "a/stuck", "a/gone"].map(String::from).to_vec();
        let result = backend
            .delete_assets_batch(&ids, ResourceKind::Image)
            .await
            .unwrap();
        assert_eq!(result.statuses["a/ok"], DeletionStatus::Deleted);
        assert_eq!(result.statuses["a/gone"], DeletionStatus::NotFound);
        assert_eq!(result.unconfirmed(&ids), vec!["a/stuck"]);
    }

    #[tokio::test]
    async fn test_upload_picks_unused_id() {
        let backend = MemoryAssetBackend::new();
        let request = UploadRequest {
            file: "data:image/png;base64,iVBORw0KGgoAAAA".to_string(),
            folder: "home/events".to_string(),
            filename: Some("poster.png".to_string()),
        };

        let first = backend.upload_asset(&request).await.unwrap();
        let second = backend.upload_asset(&request).await.unwrap();

        assert_eq!(first.public_id, "home/events/poster");
        assert_eq!(second.public_id, "home/events/poster_1");
        assert_eq!(first.kind, ResourceKind::Image);
        assert_eq!(first.format, "png");
        assert_eq!(first.filename.as_deref(), Some("poster"));
        assert_eq!(backend.calls().upload, 2);
        assert!(backend.folder_exists("home/events"));
    }
}
