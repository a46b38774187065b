//! Recursive folder deletion.
//!
//! The walk is a depth-first worklist of [`Task`]s. Visiting a folder purges
//! its assets and lists its children under every spelling of its path, then
//! schedules those children ahead of its own `Finish`, so a folder is removed
//! only after everything below it.

use futures::{StreamExt, stream};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::MediaLibrary;
use super::report::{FailedStep, OperationReport};
use crate::error::Result;
use crate::remote::{DestroyOutcome, ResourceKind};

enum Task {
    Visit(String),
    Finish {
        path: String,
        /// Other spellings of `path` that held assets or subfolders.
        alias_folders: Vec<String>,
    },
}

pub(super) async fn run(library: &MediaLibrary, root: &str) -> Result<OperationReport> {
    let mut report = OperationReport::default();
    let mut stack = vec![Task::Visit(root.to_string())];

    while let Some(task) = stack.pop() {
        match task {
            Task::Visit(path) => {
                if path != root {
                    report.subfolders_visited += 1;
                }

                let mut alias_folders = Vec::new();
                // Keyed by the unaliased spelling so a child seen under both
                // spellings is visited once.
                let mut children = BTreeMap::new();
                for variant in library.alias.variants(&path) {
                    let purged = purge_folder_assets(library, &variant, &mut report).await;
                    let subfolders = match library.service.subfolders_or_empty(&variant).await {
                        Ok(subfolders) => subfolders,
                        Err(e) => {
                            warn!(path = %variant, error = %e, "Failed to list subfolders, continuing");
                            report.record(&variant, FailedStep::ListSubfolders, &e);
                            Vec::new()
                        },
                    };
                    if variant != path && (purged > 0 || !subfolders.is_empty()) {
                        alias_folders.push(variant);
                    }
                    for child in subfolders {
                        let key = library.alias.unaliased(&child.path).to_string();
                        children.entry(key).or_insert(child.path);
                    }
                }

                stack.push(Task::Finish {
                    path,
                    alias_folders,
                });
                stack.extend(children.into_values().rev().map(Task::Visit));
            },
            Task::Finish {
                path,
                alias_folders,
            } => {
                remove_folder(library, &path).await?;
                for alias in alias_folders {
                    if let Err(e) = remove_folder(library, &alias).await {
                        warn!(path = %alias, error = %e, "Failed to remove aliased folder");
                        report.record(&alias, FailedStep::DeleteFolder, &e);
                    }
                }
            },
        }
    }

    Ok(report)
}

async fn remove_folder(library: &MediaLibrary, path: &str) -> Result<()> {
    match library.service.delete_folder(path).await {
        Ok(()) => {
            debug!(path, "Folder removed");
            Ok(())
        },
        Err(e) if e.is_not_found() => {
            debug!(path, "Folder already absent");
            Ok(())
        },
        Err(e) => Err(e),
    }
}

/// Deletes every direct asset of `folder`. Returns how many were deleted.
async fn purge_folder_assets(
    library: &MediaLibrary,
    folder: &str,
    report: &mut OperationReport,
) -> usize {
    let assets = match library.service.collect_folder(folder).await {
        Ok(assets) => assets,
        Err(e) if e.is_not_found() => return 0,
        Err(e) => {
            warn!(folder, error = %e, "Failed to enumerate folder, continuing");
            report.record(folder, FailedStep::Search, &e);
            return 0;
        },
    };
    if assets.is_empty() {
        return 0;
    }

    let mut by_kind: BTreeMap<ResourceKind, Vec<String>> = BTreeMap::new();
    for asset in assets {
        by_kind.entry(asset.kind).or_default().push(asset.public_id);
    }

    let chunks: Vec<(ResourceKind, Vec<String>)> = by_kind
        .into_iter()
        .flat_map(|(kind, ids)| {
            ids.chunks(library.batch_size)
                .map(|chunk| (kind, chunk.to_vec()))
                .collect::<Vec<_>>()
        })
        .collect();

    let service = &library.service;
    let results: Vec<_> = stream::iter(chunks)
        .map(|(kind, ids)| async move {
            let result = service.delete_assets_batch(&ids, kind).await;
            (kind, ids, result)
        })
        .buffer_unordered(library.delete_concurrency)
        .collect()
        .await;

    let mut deleted = 0;
    for (kind, ids, result) in results {
        let leftovers: Vec<String> = match result {
            Ok(batch) => {
                deleted += batch.deleted_count();
                debug!(folder, %kind, requested = ids.len(), deleted = batch.deleted_count(), "Batch delete finished");
                batch.unconfirmed(&ids).into_iter().cloned().collect()
            },
            Err(e) => {
                warn!(folder, %kind, count = ids.len(), error = %e, "Batch delete failed, deleting individually");
                ids
            },
        };

        for id in leftovers {
            match service.destroy_asset(&id, kind).await {
                Ok(DestroyOutcome::Deleted) => deleted += 1,
                Ok(DestroyOutcome::NotFound) => {},
                Err(e) if e.is_not_found() => {},
                Err(e) => {
                    warn!(id = %id, %kind, error = %e, "Failed to delete asset");
                    report.record(&id, FailedStep::DestroyAsset, &e);
                },
            }
        }
    }

    report.assets_deleted += deleted;
    info!(folder, deleted, "Purged folder assets");
    deleted
}
