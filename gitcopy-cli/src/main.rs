//! gitcopy: push a local file or directory to a GitHub repository branch
//! and open a pull request for it.
//!
//! # Usage
//!
//! ```text
//! INPUT_OWNER=acme INPUT_REPO=docs GITHUB_TOKEN=... \
//! INPUT_DIRECTORY=site INPUT_DESTINATION_DIRECTORY=public gitcopy
//!
//! gitcopy --owner acme --repo docs --file-path README.md \
//!         --destination-file-path docs/README.md --dry-run
//! ```
//!
//! Every option may be given as a flag or through its environment variable.

mod output;

use anyhow::{Context, Result};
use clap::Parser;

use gitcopy_core::{ConfigInputs, SyncConfig};
use gitcopy_github::GithubHost;
use gitcopy_sync::{run_sync, FsLocalFiles};

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "gitcopy",
    version,
    about = "Sync a local file or directory to a GitHub branch and open a pull request",
    long_about = None,
)]
struct Cli {
    /// Repository owner (user or organization).
    #[arg(long, env = "INPUT_OWNER")]
    owner: Option<String>,

    /// Repository name.
    #[arg(long, env = "INPUT_REPO")]
    repo: Option<String>,

    /// Access token with contents and pull request permissions.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Fallback token source used when GITHUB_TOKEN is unset.
    #[arg(long, env = "INPUT_TOKEN", hide = true, hide_env_values = true)]
    input_token: Option<String>,

    /// API base URL, for GitHub Enterprise.
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,

    /// Branch the working branch is created from [default: master].
    #[arg(long, env = "INPUT_REF_BRANCH")]
    ref_branch: Option<String>,

    /// Working branch to write to [default: random UUID].
    #[arg(long, env = "INPUT_BRANCH")]
    branch: Option<String>,

    /// Local file to sync.
    #[arg(long, env = "INPUT_FILE_PATH")]
    file_path: Option<String>,

    /// Repository path the file is written to.
    #[arg(long, env = "INPUT_DESTINATION_FILE_PATH")]
    destination_file_path: Option<String>,

    /// Local directory to sync recursively.
    #[arg(long, env = "INPUT_DIRECTORY")]
    directory: Option<String>,

    /// Repository directory the files are written under.
    #[arg(long, env = "INPUT_DESTINATION_DIRECTORY")]
    destination_directory: Option<String>,

    /// Pull request title.
    #[arg(long, env = "INPUT_PULL_MESSAGE")]
    pull_message: Option<String>,

    /// Pull request description.
    #[arg(long, env = "INPUT_PULL_DESCRIPTION")]
    pull_description: Option<String>,

    /// Comma-separated user reviewers.
    #[arg(long, env = "INPUT_REVIEWERS")]
    reviewers: Option<String>,

    /// Comma-separated team reviewers.
    #[arg(long, env = "INPUT_TEAM_REVIEWERS")]
    team_reviewers: Option<String>,

    /// Show what would be written without touching the repository.
    #[arg(long, env = "INPUT_DRY_RUN", value_parser = parse_flag)]
    dry_run: bool,

    /// Print the run report as JSON.
    #[arg(long, env = "INPUT_JSON_REPORT", value_parser = parse_flag)]
    json: bool,
}

/// Boolean inputs arrive as strings; unset workflow inputs are passed as "".
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "n" | "off" | "0" => Ok(false),
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        other => Err(format!("expected true or false, got '{other}'")),
    }
}

impl Cli {
    fn into_inputs(self) -> ConfigInputs {
        ConfigInputs {
            owner: self.owner,
            repo: self.repo,
            token: self.token.or(self.input_token),
            api_url: self.api_url,
            ref_branch: self.ref_branch,
            branch: self.branch,
            file_path: self.file_path,
            destination_file_path: self.destination_file_path,
            directory: self.directory,
            destination_directory: self.destination_directory,
            pull_message: self.pull_message,
            pull_description: self.pull_description,
            reviewers: self.reviewers,
            team_reviewers: self.team_reviewers,
            dry_run: self.dry_run,
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let json = cli.json;
    let config = SyncConfig::from_inputs(cli.into_inputs(), chrono::Local::now().naive_local())
        .context("invalid configuration")?;
    let host = GithubHost::from_config(&config).context("cannot set up GitHub client")?;

    tracing::info!(
        "syncing to {} (reference '{}', working '{}')",
        config.repository,
        config.reference_branch,
        config.working_branch
    );
    let report = run_sync(&host, &FsLocalFiles, &config)
        .with_context(|| format!("sync to {} failed", config.repository))?;

    if json {
        output::print_json(&report)?;
    } else {
        output::print_summary(&report);
    }
    Ok(())
}

/// Logs go to stderr so `--json` output stays machine-readable.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
