//! gitcopy core library: domain types, run configuration and the remote host trait.
//!
//! - [`types`]: branches, remote files, change sets, review requests
//! - [`config`]: [`SyncConfig`] validation
//! - [`remote`]: the [`RepositoryHost`] capability trait and [`RemoteError`]
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod remote;
pub mod types;

pub use config::{AccessToken, ConfigInputs, ReviewSettings, SyncConfig, SyncTarget};
pub use error::ConfigError;
pub use remote::{RemoteError, RepositoryHost};
pub use types::{
    git_blob_id, Branch, ChangeItem, ChangeKind, ChangeSet, CommitResult, ContentEncoding, RemoteFile,
    RepositoryRef, ReviewRequest, ReviewRequestId, Reviewers, RevisionMarker,
};
