//! Error types for gitcopy-core.

use thiserror::Error;

/// Invalid or incomplete run configuration.
///
/// Always raised before any remote call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required input is missing or blank.
    #[error("missing input '{0}'")]
    Missing(&'static str),

    /// One input was given without its counterpart.
    #[error("input '{given}' requires input '{required}'")]
    Unpaired {
        given: &'static str,
        required: &'static str,
    },

    /// Neither a file nor a directory was given.
    #[error("file or directory is required")]
    NothingToSync,
}
