//! Recursive folder rename.
//!
//! Each visited folder migrates its own assets, schedules its children with
//! their destination paths, and is cleaned up by a `Finish` task once every
//! child has been migrated.

use tracing::{debug, warn};

use super::MediaLibrary;
use super::report::{FailedStep, OperationReport};
use crate::paths::join;
use crate::remote::{Asset, ResourceKind};

enum Task {
    Visit { from: String, to: String },
    Finish { from: String },
}

pub(super) async fn run(library: &MediaLibrary, from_root: &str, to_root: &str) -> OperationReport {
    let mut report = OperationReport::default();
    let mut stack = vec![Task::Visit {
        from: from_root.to_string(),
        to: to_root.to_string(),
    }];

    while let Some(task) = stack.pop() {
        match task {
            Task::Visit { from, to } => {
                if from != from_root {
                    report.subfolders_visited += 1;
                }

                let assets = discover(library, &from, &mut report).await;
                for asset in &assets {
                    migrate(library, asset, &from, &to, &mut report).await;
                }

                let children = match library.service.subfolders_or_empty(&from).await {
                    Ok(children) => children,
                    Err(e) => {
                        warn!(from = %from, error = %e, "Failed to list subfolders, continuing");
                        report.record(&from, FailedStep::ListSubfolders, &e);
                        Vec::new()
                    },
                };

                if assets.is_empty() && children.is_empty() {
                    match library.service.create_folder(&to).await {
                        Ok(_) => {
                            debug!(to = %to, "Created placeholder for empty folder");
                            report.placeholders_created += 1;
                        },
                        Err(e) => {
                            warn!(to = %to, error = %e, "Failed to create placeholder");
                            report.record(&to, FailedStep::CreateFolder, &e);
                        },
                    }
                }

                stack.push(Task::Finish { from: from.clone() });
                stack.extend(children.into_iter().rev().map(|child| Task::Visit {
                    to: join(&to, &child.name),
                    from: child.path,
                }));
            },
            Task::Finish { from } => match library.service.delete_folder(&from).await {
                Ok(()) => debug!(from = %from, "Removed source folder"),
                Err(e) if e.is_not_found() => {},
                Err(e) => {
                    warn!(from = %from, error = %e, "Failed to remove source folder");
                    report.record(&from, FailedStep::DeleteFolder, &e);
                },
            },
        }
    }

    report
}

/// Lists the folder's assets, falling back to prefix listing when the search
/// index has nothing for it.
async fn discover(library: &MediaLibrary, from: &str, report: &mut OperationReport) -> Vec<Asset> {
    match library.service.collect_folder(from).await {
        Ok(assets) if !assets.is_empty() => return assets,
        Ok(_) => {},
        Err(e) if e.is_not_found() => {},
        Err(e) => {
            warn!(from, error = %e, "Search failed, falling back to prefix listing");
            report.record(from, FailedStep::Search, &e);
        },
    }

    let prefix = format!("{from}/");
    let mut found = Vec::new();
    for kind in ResourceKind::ALL {
        match library.service.collect_prefix(&prefix, kind).await {
            Ok(assets) => found.extend(assets),
            Err(e) if e.is_not_found() => {},
            Err(e) => {
                warn!(from, %kind, error = %e, "Prefix listing failed");
                report.record(from, FailedStep::Search, &e);
            },
        }
    }
    if !found.is_empty() {
        debug!(from, count = found.len(), "Prefix listing found assets the index missed");
    }
    found
}

async fn migrate(
    library: &MediaLibrary,
    asset: &Asset,
    from: &str,
    to: &str,
    report: &mut OperationReport,
) {
    let Some(target) = library.alias.rebase(&asset.public_id, from, to) else {
        warn!(id = %asset.public_id, from, "Asset is not below the source folder, skipping");
        report.skipped.push(asset.public_id.clone());
        return;
    };
    if target == asset.public_id {
        debug!(id = %target, "Asset already at its destination");
        return;
    }

    match library
        .service
        .rename_asset(&asset.public_id, &target, asset.kind)
        .await
    {
        Ok(renamed) => {
            debug!(from = %asset.public_id, to = %renamed.public_id, "Renamed asset");
            report.assets_migrated += 1;
        },
        Err(e) => {
            warn!(id = %asset.public_id, target = %target, error = %e, "Failed to rename asset");
            report.record(&asset.public_id, FailedStep::RenameAsset, &e);
        },
    }
}
