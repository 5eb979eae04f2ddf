//! Request and response bodies for the GitHub REST endpoints we call.

use serde::{Deserialize, Serialize};

use gitcopy_core::ContentEncoding;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub name: String,
    pub object: GitObject,
}

/// `git/refs/heads/{name}` answers with an array when `name` is only a
/// prefix of existing refs.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RefLookup {
    Exact(GitRef),
    Prefix(Vec<GitRef>),
}

impl RefLookup {
    /// The ref named exactly `full_name`, if present.
    pub fn exact(self, full_name: &str) -> Option<GitRef> {
        match self {
            RefLookup::Exact(r) if r.name == full_name => Some(r),
            RefLookup::Exact(_) => None,
            RefLookup::Prefix(refs) => refs.into_iter().find(|r| r.name == full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct Contents {
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: ContentEncoding,
}

#[derive(Debug, Deserialize)]
pub struct ContentsWrite {
    pub commit: Sha,
}

#[derive(Debug, Deserialize)]
pub struct Sha {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub tree: Sha,
}

#[derive(Debug, Deserialize)]
pub struct Pull {
    pub number: u64,
}

/// Error body GitHub attaches to non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CreateRef<'a> {
    #[serde(rename = "ref")]
    pub name: String,
    pub sha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UpdateRef<'a> {
    pub sha: &'a str,
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct PutContents<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CreateBlob {
    pub content: String,
    pub encoding: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CreateTree<'a> {
    pub base_tree: &'a str,
    pub tree: Vec<TreeEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TreeEntry<'a> {
    pub path: &'a str,
    pub mode: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCommit<'a> {
    pub message: &'a str,
    pub tree: &'a str,
    pub parents: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CreatePull<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: &'a str,
    pub base: &'a str,
    pub maintainer_can_modify: bool,
}

#[derive(Debug, Serialize)]
pub struct RequestReviewers<'a> {
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub reviewers: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub team_reviewers: &'a [String],
}
