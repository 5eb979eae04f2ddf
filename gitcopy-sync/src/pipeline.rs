//! End-to-end sync run: resolve, plan, commit, request review.

use serde::Serialize;

use gitcopy_core::{RepositoryHost, SyncConfig, SyncTarget};

use crate::branch::{create_working_branch, resolve_branches};
use crate::committer::{commit_changes, CommitStrategy};
use crate::diff::{preview_changes, FileDiff};
use crate::error::{io_err, SyncError};
use crate::local::{remote_join, LocalFiles};
use crate::planner::{plan_changes, FileAction, FilePlan, PlanMode, SourcePair};
use crate::review::{request_review, ReviewOutcome};

/// Summary of a sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub repository: String,
    pub reference_branch: String,
    pub read_from: String,
    pub write_to: String,
    pub created_branch: bool,
    pub dry_run: bool,
    pub files: Vec<FilePlan>,
    pub commits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<u64>,
    pub reviewers_rejected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub previews: Vec<FileDiff>,
}

impl SyncReport {
    pub fn count(&self, pred: impl Fn(&FileAction) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.action)).count()
    }

    /// Number of planned creates plus updates.
    pub fn changed(&self) -> usize {
        self.count(|a| matches!(a, FileAction::Create | FileAction::Update))
    }

    /// `true` when nothing differed from the remote state.
    pub fn nothing_to_sync(&self) -> bool {
        self.changed() == 0
    }
}

/// Run one synchronization described by `config`.
///
/// Both targets are planned against the current remote state first. A
/// missing working branch is created only when some file needs writing, so
/// a branch cut by this run always ends up with its pull request. The single
/// file (if any) is committed first, one commit per write; the directory
/// follows as one batched commit.
pub fn run_sync(
    host: &dyn RepositoryHost,
    local: &dyn LocalFiles,
    config: &SyncConfig,
) -> Result<SyncReport, SyncError> {
    let branches = resolve_branches(host, &config.reference_branch, &config.working_branch)?;

    let mut plans = Vec::with_capacity(2);
    if let Some(target) = &config.file {
        let pairs = [SourcePair::new(&target.source, &target.destination)];
        let plan = plan_changes(
            host,
            local,
            &branches.read_from,
            &pairs,
            PlanMode::SingleFile,
            &format!("{} file sync", target.destination),
        )?;
        plans.push((plan, CommitStrategy::PerFile));
    }
    if let Some(target) = &config.directory {
        let pairs = directory_pairs(local, target)?;
        let plan = plan_changes(
            host,
            local,
            &branches.read_from,
            &pairs,
            PlanMode::Directory,
            &format!("Batch update files in {}", target.destination),
        )?;
        if plan.changes.is_empty() {
            tracing::info!("no files need updating in {}", target.destination);
        }
        plans.push((plan, CommitStrategy::Batched));
    }

    let has_changes = plans.iter().any(|(plan, _)| !plan.changes.is_empty());
    let created_branch = branches.created_new && has_changes;
    if branches.created_new && !has_changes {
        tracing::info!(
            "nothing to synchronize; branch '{}' not created",
            branches.write_to
        );
    }

    let mut files = Vec::new();
    let mut commits = Vec::new();
    let mut previews = Vec::new();

    if config.dry_run {
        if created_branch {
            tracing::info!(
                "[dry-run] would create branch '{}' from '{}' at {}",
                branches.write_to,
                branches.reference.name,
                branches.reference.revision
            );
        }
        for (plan, _) in plans {
            previews.extend(preview_changes(host, &branches.read_from, &plan.changes)?);
            files.extend(plan.files);
        }
    } else {
        if created_branch {
            create_working_branch(host, &branches)?;
        }
        for (plan, strategy) in plans {
            let outcome = commit_changes(host, &branches.write_to, &plan.changes, strategy)?;
            commits.extend(outcome.commits().iter().map(|c| c.sha.0.clone()));
            files.extend(plan.files);
        }
    }

    let review = if config.dry_run || commits.is_empty() {
        ReviewOutcome::Skipped
    } else {
        request_review(host, &branches, &config.review)?
    };

    let (pull_request, reviewers_rejected) = match review {
        ReviewOutcome::Skipped => (None, false),
        ReviewOutcome::Opened {
            id,
            reviewers_rejected,
        } => (Some(id.0), reviewers_rejected),
    };

    Ok(SyncReport {
        repository: config.repository.to_string(),
        reference_branch: branches.reference.name.clone(),
        read_from: branches.read_from,
        write_to: branches.write_to,
        created_branch,
        dry_run: config.dry_run,
        files,
        commits,
        pull_request,
        reviewers_rejected,
        previews,
    })
}

fn directory_pairs(
    local: &dyn LocalFiles,
    target: &SyncTarget,
) -> Result<Vec<SourcePair>, SyncError> {
    let relative = local
        .list(&target.source)
        .map_err(|e| io_err(&target.source, e))?;
    Ok(relative
        .into_iter()
        .map(|rel| {
            let destination = remote_join(&target.destination, &rel);
            SourcePair::new(target.source.join(rel), destination)
        })
        .collect())
}
