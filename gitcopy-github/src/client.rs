//! Blocking GitHub REST client implementing [`RepositoryHost`].

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use ureq::{Agent, AgentBuilder, Response};
use url::Url;

use gitcopy_core::{
    AccessToken, Branch, ChangeItem, CommitResult, RemoteError, RemoteFile, RepositoryHost,
    RepositoryRef, ReviewRequestId, Reviewers, RevisionMarker, SyncConfig,
};

use crate::error::GithubError;
use crate::wire::{
    ApiMessage, Commit, Contents, ContentsWrite, CreateBlob, CreateCommit, CreatePull, CreateRef,
    CreateTree, GitRef, Pull, PutContents, RefLookup, RequestReviewers, Sha, TreeEntry,
    UpdateRef,
};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const TIMEOUT: Duration = Duration::from_secs(30);
const FILE_MODE: &str = "100644";

/// [`RepositoryHost`] backed by the GitHub REST API.
///
/// Every call is a single blocking request; nothing is retried.
pub struct GithubHost {
    agent: Agent,
    base: Url,
    repository: RepositoryRef,
    token: AccessToken,
}

impl fmt::Debug for GithubHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubHost")
            .field("base", &self.base.as_str())
            .field("repository", &self.repository)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl GithubHost {
    pub fn new(
        api_url: &str,
        repository: RepositoryRef,
        token: AccessToken,
    ) -> Result<Self, GithubError> {
        let base = Url::parse(api_url).map_err(|source| GithubError::InvalidApiUrl {
            url: api_url.to_string(),
            source,
        })?;
        if base.cannot_be_a_base() {
            return Err(GithubError::NotABaseUrl {
                url: api_url.to_string(),
            });
        }

        let agent = AgentBuilder::new()
            .timeout(TIMEOUT)
            .user_agent(&format!("gitcopy/{}", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            agent,
            base,
            repository,
            token,
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, GithubError> {
        Self::new(
            &config.api_url,
            config.repository.clone(),
            config.token.clone(),
        )
    }

    /// `{base}/repos/{owner}/{repo}/{path}`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([
                    "repos",
                    self.repository.owner.as_str(),
                    self.repository.name.as_str(),
                ])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        tracing::debug!("{method} {url}");
        self.agent
            .request(method, url.as_str())
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
            .set("Authorization", &format!("token {}", self.token.expose()))
    }

    fn get(&self, url: &Url) -> Result<Response, RemoteError> {
        into_remote(self.request("GET", url).call())
    }

    fn send<B: Serialize>(
        &self,
        method: &str,
        url: &Url,
        body: &B,
    ) -> Result<Response, RemoteError> {
        into_remote(self.request(method, url).send_json(body))
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        decode(self.send("POST", &self.endpoint(path), body)?)
    }
}

impl RepositoryHost for GithubHost {
    fn get_branch(&self, name: &str) -> Result<Option<Branch>, RemoteError> {
        let full = format!("refs/heads/{name}");
        let url = self.endpoint(&format!("git/{full}"));
        let lookup = found(self.get(&url).and_then(decode::<RefLookup>))?;
        Ok(lookup
            .and_then(|l| l.exact(&full))
            .map(|r| Branch::new(name, r.object.sha)))
    }

    fn create_branch(&self, name: &str, from: &RevisionMarker) -> Result<Branch, RemoteError> {
        let created: GitRef = self.post(
            "git/refs",
            &CreateRef {
                name: format!("refs/heads/{name}"),
                sha: &from.0,
            },
        )?;
        Ok(Branch::new(name, created.object.sha))
    }

    fn get_file(&self, branch: &str, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        let mut url = self.endpoint(&format!("contents/{path}"));
        url.query_pairs_mut().append_pair("ref", branch);

        let Some(contents) = found(self.get(&url).and_then(decode::<Contents>))? else {
            return Ok(None);
        };
        if contents.kind != "file" {
            return Err(RemoteError::Decode(format!(
                "'{path}' is a {}, not a file",
                contents.kind
            )));
        }
        Ok(Some(RemoteFile {
            path: contents.path,
            revision: contents.sha.into(),
            content: contents.content,
            encoding: contents.encoding,
        }))
    }

    fn write_file(
        &self,
        branch: &str,
        item: &ChangeItem,
        message: &str,
    ) -> Result<CommitResult, RemoteError> {
        let body = PutContents {
            message,
            content: item.encoded_content(),
            branch,
            sha: item.prior.as_ref().map(|m| m.0.as_str()),
        };
        let url = self.endpoint(&format!("contents/{}", item.path));
        let written: ContentsWrite = decode(self.send("PUT", &url, &body)?)?;
        Ok(CommitResult {
            sha: written.commit.sha.into(),
        })
    }

    fn write_files_batch(
        &self,
        branch: &str,
        message: &str,
        items: &[ChangeItem],
    ) -> Result<CommitResult, RemoteError> {
        let tip = self
            .get_branch(branch)?
            .ok_or_else(|| RemoteError::Status {
                status: 404,
                message: format!("branch '{branch}' not found"),
            })?;
        let parent_url = self.endpoint(&format!("git/commits/{}", tip.revision));
        let parent: Commit = decode(self.get(&parent_url)?)?;

        let mut tree = Vec::with_capacity(items.len());
        for item in items {
            let blob: Sha = self.post(
                "git/blobs",
                &CreateBlob {
                    content: item.encoded_content(),
                    encoding: "base64",
                },
            )?;
            tree.push(TreeEntry {
                path: &item.path,
                mode: FILE_MODE,
                kind: "blob",
                sha: blob.sha,
            });
        }

        let new_tree: Sha = self.post(
            "git/trees",
            &CreateTree {
                base_tree: &parent.tree.sha,
                tree,
            },
        )?;
        let commit: Sha = self.post(
            "git/commits",
            &CreateCommit {
                message,
                tree: &new_tree.sha,
                parents: vec![tip.revision.0.as_str()],
            },
        )?;
        self.send(
            "PATCH",
            &self.endpoint(&format!("git/refs/heads/{branch}")),
            &UpdateRef {
                sha: &commit.sha,
                force: false,
            },
        )?;

        Ok(CommitResult {
            sha: commit.sha.into(),
        })
    }

    fn create_review_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        description: &str,
    ) -> Result<ReviewRequestId, RemoteError> {
        let pull: Pull = self.post(
            "pulls",
            &CreatePull {
                title,
                body: description,
                head,
                base,
                maintainer_can_modify: true,
            },
        )?;
        Ok(ReviewRequestId(pull.number))
    }

    fn add_reviewers(
        &self,
        id: ReviewRequestId,
        reviewers: &Reviewers,
    ) -> Result<(), RemoteError> {
        let url = self.endpoint(&format!("pulls/{}/requested_reviewers", id.0));
        self.send(
            "POST",
            &url,
            &RequestReviewers {
                reviewers: &reviewers.users,
                team_reviewers: &reviewers.teams,
            },
        )?;
        Ok(())
    }
}

fn into_remote(result: Result<Response, ureq::Error>) -> Result<Response, RemoteError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => {
            let message = response
                .into_json::<ApiMessage>()
                .map(|m| m.message)
                .unwrap_or_else(|_| "no error message".to_string());
            Err(classify(status, message))
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(RemoteError::Transport(transport.to_string()))
        }
    }
}

pub(crate) fn classify(status: u16, message: String) -> RemoteError {
    match status {
        422 => RemoteError::Unprocessable { message },
        _ => RemoteError::Status { status, message },
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response
        .into_json()
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Turn a 404 into `Ok(None)`.
fn found<T>(result: Result<T, RemoteError>) -> Result<Option<T>, RemoteError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RemoteError::Status { status: 404, .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn host(api_url: &str) -> GithubHost {
        GithubHost::new(
            api_url,
            RepositoryRef::new("acme", "docs"),
            AccessToken::new("secret"),
        )
        .expect("valid url")
    }

    #[rstest]
    #[case("https://api.github.com", "git/refs/heads/main", "https://api.github.com/repos/acme/docs/git/refs/heads/main")]
    #[case("https://api.github.com/", "git/refs", "https://api.github.com/repos/acme/docs/git/refs")]
    #[case("https://ghe.example.com/api/v3", "pulls/7/requested_reviewers", "https://ghe.example.com/api/v3/repos/acme/docs/pulls/7/requested_reviewers")]
    #[case("https://api.github.com", "git/refs/heads/feature/docs", "https://api.github.com/repos/acme/docs/git/refs/heads/feature/docs")]
    #[case("https://api.github.com", "contents/my docs/a#1.md", "https://api.github.com/repos/acme/docs/contents/my%20docs/a%231.md")]
    fn endpoints_are_built_under_the_repository(
        #[case] base: &str,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(host(base).endpoint(path).as_str(), expected);
    }

    #[rstest]
    #[case(422, true)]
    #[case(404, false)]
    #[case(409, false)]
    #[case(500, false)]
    fn only_422_is_unprocessable(#[case] status: u16, #[case] unprocessable: bool) {
        let err = classify(status, "nope".into());
        assert_eq!(
            matches!(err, RemoteError::Unprocessable { .. }),
            unprocessable
        );
    }

    #[test]
    fn not_found_becomes_none() {
        let missing: Result<u8, _> = Err(RemoteError::Status {
            status: 404,
            message: "Not Found".into(),
        });
        assert!(found(missing).unwrap().is_none());

        let denied: Result<u8, _> = Err(RemoteError::Status {
            status: 403,
            message: "Forbidden".into(),
        });
        assert!(found(denied).is_err());
    }

    #[test]
    fn unparseable_api_url_is_rejected() {
        let err = GithubHost::new(
            "not a url",
            RepositoryRef::new("acme", "docs"),
            AccessToken::new("t"),
        )
        .unwrap_err();
        assert!(matches!(err, GithubError::InvalidApiUrl { .. }));

        let err = GithubHost::new(
            "mailto:ops@example.com",
            RepositoryRef::new("acme", "docs"),
            AccessToken::new("t"),
        )
        .unwrap_err();
        assert!(matches!(err, GithubError::NotABaseUrl { .. }));
    }

    #[test]
    fn debug_output_hides_token() {
        let dbg = format!("{:?}", host("https://api.github.com"));
        assert!(!dbg.contains("secret"));
    }
}
