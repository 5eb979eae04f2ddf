//! Domain types shared by the sync engine and the repository adapters.
//!
//! Remote paths are always `/`-separated `String`s; local paths are `PathBuf`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque revision identifier (commit sha for branches, blob sha for files).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RevisionMarker(pub String);

impl fmt::Display for RevisionMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RevisionMarker {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RevisionMarker {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of an opened pull request (its number on the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewRequestId(pub u64);

impl fmt::Display for ReviewRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Repository / branches
// ---------------------------------------------------------------------------

/// Owner and name of the remote repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A remote branch and the commit it currently points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    pub revision: RevisionMarker,
}

impl Branch {
    pub fn new(name: impl Into<String>, revision: impl Into<RevisionMarker>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Remote files
// ---------------------------------------------------------------------------

/// Transport encoding of a [`RemoteFile`]'s content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    #[default]
    Base64,
    /// Content is carried verbatim (or not at all, for oversized blobs).
    #[serde(other)]
    None,
}

/// Git object id of a blob holding `content`: SHA-1 over `blob {len}\0`
/// followed by the bytes, hex encoded.
pub fn git_blob_id(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// A file as stored on a remote branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub path: String,
    pub revision: RevisionMarker,
    /// Content exactly as the host transported it.
    pub content: String,
    pub encoding: ContentEncoding,
}

impl RemoteFile {
    /// Build a base64-encoded remote file from raw bytes.
    pub fn from_bytes(
        path: impl Into<String>,
        revision: impl Into<RevisionMarker>,
        bytes: &[u8],
    ) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
            content: STANDARD.encode(bytes),
            encoding: ContentEncoding::Base64,
        }
    }

    /// Whether the stored content decodes to exactly `local`.
    ///
    /// Base64 content is compared against the canonical encoding of `local`
    /// after dropping the line breaks hosts insert every 60 characters.
    /// Hosts omit the content of large files, so those are compared by
    /// their git blob id instead.
    pub fn content_matches(&self, local: &[u8]) -> bool {
        match self.encoding {
            ContentEncoding::Base64 => {
                let stored: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                stored == STANDARD.encode(local)
            }
            ContentEncoding::None => self.revision.0 == git_blob_id(local),
        }
    }

    /// Decoded content bytes.
    pub fn decoded(&self) -> Result<Vec<u8>, base64::DecodeError> {
        match self.encoding {
            ContentEncoding::Base64 => {
                let stored: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                STANDARD.decode(stored)
            }
            ContentEncoding::None => Ok(self.content.as_bytes().to_vec()),
        }
    }
}

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// Whether a [`ChangeItem`] creates a new file or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Update => write!(f, "update"),
        }
    }
}

/// One file write the committer must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeItem {
    pub path: String,
    pub content: Vec<u8>,
    /// Revision of the remote file being replaced; `None` for creates.
    pub prior: Option<RevisionMarker>,
}

impl ChangeItem {
    pub fn create(path: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            content,
            prior: None,
        }
    }

    pub fn update(path: impl Into<String>, content: Vec<u8>, prior: RevisionMarker) -> Self {
        Self {
            path: path.into(),
            content,
            prior: Some(prior),
        }
    }

    pub fn kind(&self) -> ChangeKind {
        if self.prior.is_some() {
            ChangeKind::Update
        } else {
            ChangeKind::Create
        }
    }

    /// Content in the base64 form hosts expect on the wire.
    pub fn encoded_content(&self) -> String {
        STANDARD.encode(&self.content)
    }
}

/// Ordered, path-unique list of [`ChangeItem`]s sharing one commit message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeSet {
    message: String,
    items: Vec<ChangeItem>,
}

impl ChangeSet {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            items: Vec::new(),
        }
    }

    /// Append `item` unless its path is already present.
    ///
    /// Returns `false` when the item was dropped as a duplicate.
    pub fn push(&mut self, item: ChangeItem) -> bool {
        if self.contains(&item.path) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.items.iter().any(|i| i.path == path)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn items(&self) -> &[ChangeItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangeItem> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeItem;
    type IntoIter = std::slice::Iter<'a, ChangeItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Result of a successful write on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub sha: RevisionMarker,
}

// ---------------------------------------------------------------------------
// Review requests
// ---------------------------------------------------------------------------

/// Individual and team reviewers to attach to a review request.
///
/// Duplicates are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reviewers {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}

impl Reviewers {
    /// Parse comma-separated user and team lists, dropping blanks.
    pub fn parse(users: Option<&str>, teams: Option<&str>) -> Self {
        Self {
            users: split_list(users),
            teams: split_list(teams),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.teams.is_empty()
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A pull request to open from `head` into `base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub base: String,
    pub head: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub reviewers: Reviewers,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
