//! Run configuration: raw inputs in, validated immutable [`SyncConfig`] out.

use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::ConfigError;
use crate::types::{RepositoryRef, Reviewers};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REF_BRANCH: &str = "master";

/// Raw inputs as read from the environment. Blank values count as absent.
#[derive(Debug, Clone, Default)]
pub struct ConfigInputs {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub api_url: Option<String>,
    pub ref_branch: Option<String>,
    pub branch: Option<String>,
    pub file_path: Option<String>,
    pub destination_file_path: Option<String>,
    pub directory: Option<String>,
    pub destination_directory: Option<String>,
    pub pull_message: Option<String>,
    pub pull_description: Option<String>,
    pub reviewers: Option<String>,
    pub team_reviewers: Option<String>,
    pub dry_run: bool,
}

/// Access token; never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// A local source and where it lands in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    pub source: PathBuf,
    /// `/`-separated path inside the repository.
    pub destination: String,
}

/// Pull request title, body and reviewers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSettings {
    pub title: String,
    pub description: String,
    pub reviewers: Reviewers,
}

/// Validated configuration for one sync invocation.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub repository: RepositoryRef,
    pub token: AccessToken,
    pub api_url: String,
    pub reference_branch: String,
    pub working_branch: String,
    pub file: Option<SyncTarget>,
    pub directory: Option<SyncTarget>,
    pub review: ReviewSettings,
    pub dry_run: bool,
}

impl SyncConfig {
    /// Validate `inputs`.
    ///
    /// `now` stamps the default pull request title and description. The
    /// working branch defaults to a fresh UUID.
    pub fn from_inputs(inputs: ConfigInputs, now: NaiveDateTime) -> Result<Self, ConfigError> {
        let owner = present(inputs.owner).ok_or(ConfigError::Missing("owner"))?;
        let repo = present(inputs.repo).ok_or(ConfigError::Missing("repo"))?;
        let token = present(inputs.token).ok_or(ConfigError::Missing("token"))?;

        let file = pair(
            inputs.file_path,
            inputs.destination_file_path,
            "file_path",
            "destination_file_path",
        )?;
        let directory = pair(
            inputs.directory,
            inputs.destination_directory,
            "directory",
            "destination_directory",
        )?;
        if file.is_none() && directory.is_none() {
            return Err(ConfigError::NothingToSync);
        }

        let stamp = format!("update {}", now.format("%Y-%m-%d %H:%M:%S"));
        let reviewers = Reviewers::parse(
            inputs.reviewers.as_deref(),
            inputs.team_reviewers.as_deref(),
        );

        Ok(Self {
            repository: RepositoryRef::new(owner, repo),
            token: AccessToken::new(token),
            api_url: present(inputs.api_url)
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            reference_branch: present(inputs.ref_branch)
                .unwrap_or_else(|| DEFAULT_REF_BRANCH.to_string()),
            working_branch: present(inputs.branch)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            file,
            directory,
            review: ReviewSettings {
                title: present(inputs.pull_message).unwrap_or_else(|| stamp.clone()),
                description: present(inputs.pull_description).unwrap_or(stamp),
                reviewers,
            },
            dry_run: inputs.dry_run,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn pair(
    source: Option<String>,
    destination: Option<String>,
    source_name: &'static str,
    destination_name: &'static str,
) -> Result<Option<SyncTarget>, ConfigError> {
    match (present(source), present(destination)) {
        (Some(source), Some(destination)) => Ok(Some(SyncTarget {
            source: PathBuf::from(source),
            destination: normalize_remote_path(&destination),
        })),
        (Some(_), None) => Err(ConfigError::Unpaired {
            given: source_name,
            required: destination_name,
        }),
        (None, Some(_)) => Err(ConfigError::Unpaired {
            given: destination_name,
            required: source_name,
        }),
        (None, None) => Ok(None),
    }
}

/// Convert a user-supplied destination into a clean repository path.
///
/// Backslashes become `/`, and `.` and empty segments are dropped.
pub fn normalize_remote_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}
