//! Error types for gitcopy-github.

use thiserror::Error;

/// Failure to build a [`crate::GithubHost`].
#[derive(Debug, Error)]
pub enum GithubError {
    /// The API base URL does not parse.
    #[error("invalid API URL '{url}': {source}")]
    InvalidApiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The API base URL parses but cannot carry a path (e.g. `mailto:`).
    #[error("API URL '{url}' cannot be used as a base URL")]
    NotABaseUrl { url: String },
}
