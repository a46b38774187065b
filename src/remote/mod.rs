//! Remote asset service client.
//!
//! [`AssetBackend`] is the operation set the orchestrators need from the
//! remote service: paginated folder search, prefix listing, folder
//! management, single-asset rename and destroy, and chunked batch delete.
//!
//! Backends:
//! - [`CloudinaryBackend`] - Cloudinary Admin, Search and Upload APIs
//! - [`MemoryAssetBackend`] - in-process store for tests and local runs
//!
//! [`AssetService`] wraps either one with retry and exhaustive paging.

mod backend;
mod cloudinary;
mod memory;
mod service;
mod types;

pub use backend::AssetBackend;
pub use cloudinary::CloudinaryBackend;
pub use memory::{CallCounts, MemoryAssetBackend};
pub use service::AssetService;
pub use types::{
    Asset, BatchDeleteResult, DeletionStatus, DestroyOutcome, FolderEntry, RenamedAsset,
    ResourceKind, ResourcePage, UploadRequest,
};
