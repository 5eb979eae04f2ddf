//! Unified diff previews of a planned ChangeSet, for dry runs.

use serde::Serialize;
use similar::TextDiff;

use gitcopy_core::{ChangeKind, ChangeSet, ContentEncoding, RepositoryHost};

use crate::error::{remote_err, SyncError};

/// A rendered diff for one planned write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    /// `None` when either side is not UTF-8 text or the host did not return
    /// the current content.
    pub unified_diff: Option<String>,
}

/// Diff each planned item against its current content on `read_from`.
///
/// Creates are diffed against empty content. No files are written.
pub fn preview_changes(
    host: &dyn RepositoryHost,
    read_from: &str,
    changes: &ChangeSet,
) -> Result<Vec<FileDiff>, SyncError> {
    let mut diffs = Vec::with_capacity(changes.len());
    for item in changes {
        let existing = match item.kind() {
            ChangeKind::Create => Some(String::new()),
            ChangeKind::Update => host
                .get_file(read_from, &item.path)
                .map_err(|e| remote_err(format!("get file '{}' on '{read_from}'", item.path), e))?
                .filter(|f| f.encoding == ContentEncoding::Base64)
                .and_then(|f| f.decoded().ok())
                .and_then(|bytes| String::from_utf8(bytes).ok()),
        };
        let proposed = std::str::from_utf8(&item.content).ok();

        let unified_diff = match (existing, proposed) {
            (Some(old), Some(new)) => Some(render(&item.path, &old, new)),
            _ => None,
        };
        diffs.push(FileDiff {
            path: item.path.clone(),
            unified_diff,
        });
    }
    Ok(diffs)
}

fn render(path: &str, old: &str, new: &str) -> String {
    let old = normalize_line_endings(old);
    let new = normalize_line_endings(new);
    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
