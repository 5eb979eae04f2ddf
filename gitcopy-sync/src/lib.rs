//! # gitcopy-sync
//!
//! The synchronization engine: branch resolution, change planning, commits
//! and review requests against any [`gitcopy_core::RepositoryHost`].
//!
//! Call [`run_sync`] for a full run, or drive the stages individually with
//! [`resolve_branches`], [`plan_changes`], [`commit_changes`] and
//! [`request_review`].

pub mod branch;
pub mod committer;
pub mod diff;
pub mod error;
pub mod local;
pub mod pipeline;
pub mod planner;
pub mod review;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use branch::{create_working_branch, resolve_branches, ResolvedBranches};
pub use committer::{commit_changes, CommitOutcome, CommitStrategy};
pub use diff::{preview_changes, FileDiff};
pub use error::SyncError;
pub use local::{FsLocalFiles, LocalFiles};
pub use pipeline::{run_sync, SyncReport};
pub use planner::{plan_changes, FileAction, FilePlan, Plan, PlanMode, SourcePair};
pub use review::{request_review, ReviewOutcome};
