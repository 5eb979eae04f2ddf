//! Human and JSON rendering of a [`SyncReport`].

use anyhow::{Context, Result};
use colored::Colorize;

use gitcopy_sync::{FileAction, SyncReport};

pub fn print_json(report: &SyncReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize run report")?;
    println!("{json}");
    Ok(())
}

pub fn print_summary(report: &SyncReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    if report.nothing_to_sync() {
        println!(
            "{prefix}{} {}: nothing to synchronize",
            "✓".green().bold(),
            report.repository
        );
    } else {
        println!(
            "{prefix}{} {} ({} created, {} updated, {} unchanged, {} skipped)",
            "✓".green().bold(),
            report.repository,
            report.count(|a| matches!(a, FileAction::Create)),
            report.count(|a| matches!(a, FileAction::Update)),
            report.count(|a| matches!(a, FileAction::Unchanged)),
            report.count(|a| matches!(a, FileAction::Skipped { .. })),
        );
    }

    for file in &report.files {
        match &file.action {
            FileAction::Create => println!("  {}  {}", "+".green(), file.destination),
            FileAction::Update => println!("  {}  {}", "~".yellow(), file.destination),
            FileAction::Unchanged => println!("  ·  {}", file.destination.dimmed()),
            FileAction::Skipped { reason } => println!(
                "  {}  {} ({})",
                "!".red().bold(),
                file.destination,
                reason
            ),
        }
    }

    println!("{}", branch_line(report));
    for sha in &report.commits {
        println!("  commit {sha}");
    }
    if let Some(number) = report.pull_request {
        let suffix = if report.reviewers_rejected {
            " (reviewers could not be requested)".yellow().to_string()
        } else {
            String::new()
        };
        println!("pull request #{number} opened{suffix}");
    }

    for preview in &report.previews {
        match &preview.unified_diff {
            Some(diff) => {
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
            None => println!("Binary content differs: {}", preview.path),
        }
    }
}

fn branch_line(report: &SyncReport) -> String {
    match (report.created_branch, report.dry_run) {
        (true, true) => format!(
            "branch '{}' would be created from '{}'",
            report.write_to, report.reference_branch
        ),
        (true, false) => format!(
            "branch '{}' created from '{}'",
            report.write_to, report.reference_branch
        ),
        (false, _) => format!("branch '{}' reused", report.write_to),
    }
}
