//! Local source files: recursive listing and byte reads.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Read access to the local source tree.
pub trait LocalFiles {
    /// Every file below `root`, as sorted paths relative to `root`.
    fn list(&self, root: &Path) -> io::Result<Vec<PathBuf>>;

    /// Full content of the file at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`LocalFiles`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocalFiles;

impl LocalFiles for FsLocalFiles {
    fn list(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        walk(root, Path::new(""), &mut files)?;
        files.sort();
        Ok(files)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Symlinks are not followed; they are listed as files. Unreadable
/// subdirectories are logged and skipped.
fn walk(root: &Path, relative: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let dir = root.join(relative);
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let rel = relative.join(entry.file_name());
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            files.push(rel);
            continue;
        }
        if let Err(e) = walk(root, &rel, files) {
            tracing::warn!("skipping directory {}: {e}", root.join(&rel).display());
        }
    }
    Ok(())
}

/// Join a repository directory and a local relative path with `/`.
pub fn remote_join(destination_dir: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = destination_dir
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_string_lossy().into_owned());
        }
    }
    parts.join("/")
}
