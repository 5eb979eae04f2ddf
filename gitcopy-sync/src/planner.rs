//! Change planning: compare local bytes to remote content, emit a ChangeSet.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use gitcopy_core::{ChangeItem, ChangeSet, RepositoryHost};

use crate::error::{io_err, remote_err, SyncError};
use crate::local::LocalFiles;

/// A local file and the repository path it syncs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub local: PathBuf,
    pub destination: String,
}

impl SourcePair {
    pub fn new(local: impl Into<PathBuf>, destination: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            destination: destination.into(),
        }
    }
}

/// How per-file failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    /// One explicit file: any read or lookup failure aborts.
    SingleFile,
    /// A directory tree: failing files are logged and skipped.
    Directory,
}

/// What the planner decided for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Update,
    Unchanged,
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePlan {
    pub local: PathBuf,
    pub destination: String,
    #[serde(flatten)]
    pub action: FileAction,
}

/// The change set plus a per-file account of how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub changes: ChangeSet,
    pub files: Vec<FilePlan>,
}

/// Plan the writes needed to bring `read_from` in line with `pairs`.
///
/// A file lands in the change set iff it is absent remotely or its decoded
/// remote content differs from the local bytes. Creates carry no prior
/// marker; updates carry the remote file's marker.
pub fn plan_changes(
    host: &dyn RepositoryHost,
    local: &dyn LocalFiles,
    read_from: &str,
    pairs: &[SourcePair],
    mode: PlanMode,
    message: &str,
) -> Result<Plan, SyncError> {
    let mut changes = ChangeSet::new(message);
    let mut files = Vec::with_capacity(pairs.len());
    let mut seen = HashSet::with_capacity(pairs.len());

    for pair in pairs {
        let action = if seen.insert(pair.destination.as_str()) {
            plan_one(host, local, read_from, pair, mode, &mut changes)?
        } else {
            tracing::warn!(
                "skipping {}: destination {} already planned",
                pair.local.display(),
                pair.destination
            );
            FileAction::Skipped {
                reason: "duplicate destination".into(),
            }
        };
        files.push(FilePlan {
            local: pair.local.clone(),
            destination: pair.destination.clone(),
            action,
        });
    }

    Ok(Plan { changes, files })
}

fn plan_one(
    host: &dyn RepositoryHost,
    local: &dyn LocalFiles,
    read_from: &str,
    pair: &SourcePair,
    mode: PlanMode,
    changes: &mut ChangeSet,
) -> Result<FileAction, SyncError> {
    let content = match local.read(&pair.local) {
        Ok(bytes) => bytes,
        Err(e) if mode == PlanMode::Directory => {
            tracing::warn!("could not read file {}: {e}", pair.local.display());
            return Ok(FileAction::Skipped {
                reason: format!("read failed: {e}"),
            });
        }
        Err(e) => return Err(io_err(&pair.local, e)),
    };

    let remote = match host.get_file(read_from, &pair.destination) {
        Ok(remote) => remote,
        Err(e) if mode == PlanMode::Directory => {
            tracing::warn!(
                "could not look up {} on '{read_from}': {e}",
                pair.destination
            );
            return Ok(FileAction::Skipped {
                reason: format!("lookup failed: {e}"),
            });
        }
        Err(e) => {
            return Err(remote_err(
                format!("get file '{}' on '{read_from}'", pair.destination),
                e,
            ))
        }
    };

    match remote {
        None => {
            tracing::info!("creating file: {}", pair.destination);
            changes.push(ChangeItem::create(&pair.destination, content));
            Ok(FileAction::Create)
        }
        Some(existing) if existing.content_matches(&content) => {
            tracing::debug!("no changes file: {}", pair.destination);
            Ok(FileAction::Unchanged)
        }
        Some(existing) => {
            tracing::info!("updating file: {}", pair.destination);
            changes.push(ChangeItem::update(
                &pair.destination,
                content,
                existing.revision,
            ));
            Ok(FileAction::Update)
        }
    }
}
