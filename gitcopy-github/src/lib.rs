//! # gitcopy-github
//!
//! [`GithubHost`]: the GitHub REST implementation of
//! [`gitcopy_core::RepositoryHost`], over blocking `ureq` calls.

mod client;
pub mod error;
mod wire;

pub use client::GithubHost;
pub use error::GithubError;
