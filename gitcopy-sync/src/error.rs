//! Error types for gitcopy-sync.

use std::path::PathBuf;

use thiserror::Error;

use gitcopy_core::RemoteError;

/// All errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The reference branch does not exist, so there is nothing to branch from.
    #[error("reference branch '{branch}' not found")]
    ReferenceNotFound { branch: String },

    /// A remote call failed; `operation` names the call.
    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// A local file or directory could not be read.
    #[error("I/O error at {path}: {source}")]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::LocalRead`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::LocalRead {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Remote`].
pub(crate) fn remote_err(operation: impl Into<String>, source: RemoteError) -> SyncError {
    SyncError::Remote {
        operation: operation.into(),
        source,
    }
}
