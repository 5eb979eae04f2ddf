//! The capability surface the sync engine needs from a repository host.

use thiserror::Error;

use crate::types::{
    Branch, ChangeItem, CommitResult, RemoteFile, ReviewRequestId, Reviewers, RevisionMarker,
};

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Network, TLS or connection failure before a status was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The host answered with a status the operation does not accept.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The host refused the request as unprocessable (HTTP 422).
    #[error("unprocessable request: {message}")]
    Unprocessable { message: String },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Remote repository operations used by the engine.
///
/// Lookups return `Ok(None)` for "does not exist"; every other failure is an
/// `Err`. Implementations never retry.
pub trait RepositoryHost {
    /// Look up a branch by name.
    fn get_branch(&self, name: &str) -> Result<Option<Branch>, RemoteError>;

    /// Create branch `name` pointing at `from`.
    fn create_branch(&self, name: &str, from: &RevisionMarker) -> Result<Branch, RemoteError>;

    /// Fetch the file at `path` on `branch`.
    fn get_file(&self, branch: &str, path: &str) -> Result<Option<RemoteFile>, RemoteError>;

    /// Create or update a single file in its own commit.
    ///
    /// `item.prior` absent means create; present means update, and it must
    /// match the file's current revision.
    fn write_file(
        &self,
        branch: &str,
        item: &ChangeItem,
        message: &str,
    ) -> Result<CommitResult, RemoteError>;

    /// Write every item in one commit on `branch`.
    fn write_files_batch(
        &self,
        branch: &str,
        message: &str,
        items: &[ChangeItem],
    ) -> Result<CommitResult, RemoteError>;

    /// Open a review request merging `head` into `base`.
    fn create_review_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        description: &str,
    ) -> Result<ReviewRequestId, RemoteError>;

    /// Request reviews from the given users and teams.
    fn add_reviewers(&self, id: ReviewRequestId, reviewers: &Reviewers)
        -> Result<(), RemoteError>;
}
