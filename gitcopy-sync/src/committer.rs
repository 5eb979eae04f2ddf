//! Writes a planned ChangeSet to the working branch.

use gitcopy_core::{ChangeKind, ChangeSet, CommitResult, RepositoryHost};

use crate::error::{remote_err, SyncError};

/// How the change set is turned into commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStrategy {
    /// One commit per item, each with its own message.
    PerFile,
    /// One commit for the whole set, using the set's message.
    Batched,
}

/// Outcome of [`commit_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The change set was empty; nothing was written.
    NothingToCommit,
    Committed { commits: Vec<CommitResult> },
}

impl CommitOutcome {
    pub fn commits(&self) -> &[CommitResult] {
        match self {
            CommitOutcome::NothingToCommit => &[],
            CommitOutcome::Committed { commits } => commits,
        }
    }
}

/// Write `changes` to `write_to`. No retries; the first failure aborts.
pub fn commit_changes(
    host: &dyn RepositoryHost,
    write_to: &str,
    changes: &ChangeSet,
    strategy: CommitStrategy,
) -> Result<CommitOutcome, SyncError> {
    if changes.is_empty() {
        return Ok(CommitOutcome::NothingToCommit);
    }

    let commits = match strategy {
        CommitStrategy::PerFile => {
            let mut commits = Vec::with_capacity(changes.len());
            for item in changes {
                let message = match item.kind() {
                    ChangeKind::Create => format!("{} file created", item.path),
                    ChangeKind::Update => format!("{} file updated", item.path),
                };
                let commit = host
                    .write_file(write_to, item, &message)
                    .map_err(|e| remote_err(format!("write file '{}'", item.path), e))?;
                tracing::info!("{}d {} ({})", item.kind(), item.path, commit.sha);
                commits.push(commit);
            }
            commits
        }
        CommitStrategy::Batched => {
            tracing::info!("processing batch update for {} files", changes.len());
            let commit = host
                .write_files_batch(write_to, changes.message(), changes.items())
                .map_err(|e| remote_err(format!("batch commit to '{write_to}'"), e))?;
            tracing::info!("committed {} files ({})", changes.len(), commit.sha);
            vec![commit]
        }
    };

    Ok(CommitOutcome::Committed { commits })
}
