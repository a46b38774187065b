//! Folder-tree management for remote media asset libraries.
//!
//! Remote asset services such as Cloudinary model folders as derived
//! metadata: a folder exists while some asset lives under it or a placeholder
//! marks it. This crate implements the operations that are hard against that
//! model:
//!
//! - [`library::MediaLibrary::delete_subtree`] - recursive folder deletion
//! - [`library::MediaLibrary::rename_subtree`] - recursive folder rename/move
//! - cached folder and file listings that stay consistent with mutations
//!
//! The remote service is reached through the [`remote::AssetBackend`] trait,
//! with a Cloudinary implementation for production and an in-memory one for
//! tests and local development.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod library;
pub mod paths;
pub mod reliability;
pub mod remote;

pub use error::{Error, Result};
