//! In-memory fakes for exercising the engine without a network or disk.
//!
//! [`MemoryHost`] models branches as pointers to commit snapshots and records
//! every call it receives. [`MemoryFiles`] stands in for the local tree.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use gitcopy_core::{
    git_blob_id, Branch, ChangeItem, CommitResult, RemoteError, RemoteFile, RepositoryHost,
    ReviewRequest, ReviewRequestId, Reviewers, RevisionMarker,
};

use crate::local::LocalFiles;

/// Record of a call made against a [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    GetBranch {
        name: String,
    },
    CreateBranch {
        name: String,
        from: String,
    },
    GetFile {
        branch: String,
        path: String,
    },
    WriteFile {
        branch: String,
        path: String,
        message: String,
        prior: Option<String>,
    },
    WriteFilesBatch {
        branch: String,
        message: String,
        paths: Vec<String>,
    },
    CreateReviewRequest {
        base: String,
        head: String,
        title: String,
    },
    AddReviewers {
        id: u64,
        reviewers: Reviewers,
    },
}

impl HostCall {
    /// Whether this call changes remote content.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            HostCall::WriteFile { .. } | HostCall::WriteFilesBatch { .. }
        )
    }
}

type Snapshot = BTreeMap<String, RemoteFile>;

#[derive(Default)]
struct HostState {
    /// commit sha -> tree snapshot
    commits: HashMap<String, Snapshot>,
    /// branch name -> commit sha
    branches: BTreeMap<String, String>,
    calls: Vec<HostCall>,
    fail_next: Vec<(&'static str, RemoteError)>,
    failing_paths: HashMap<String, String>,
    failing_branches: HashMap<String, String>,
    reject_reviewers: bool,
    reviews: Vec<ReviewRequest>,
    sequence: u64,
}

impl HostState {
    fn take_failure(&mut self, op: &'static str) -> Result<(), RemoteError> {
        match self.fail_next.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(self.fail_next.remove(i).1),
            None => Ok(()),
        }
    }

    fn tip(&self, branch: &str) -> Result<(String, Snapshot), RemoteError> {
        let sha = self.branches.get(branch).ok_or_else(|| RemoteError::Status {
            status: 404,
            message: format!("branch '{branch}' not found"),
        })?;
        let snapshot = self.commits.get(sha).cloned().unwrap_or_default();
        Ok((sha.clone(), snapshot))
    }

    fn commit(&mut self, branch: &str, parent: &str, message: &str, tree: Snapshot) -> String {
        self.sequence += 1;
        let payload = format!("commit {parent}\n{}\n{message}", self.sequence);
        let sha = git_blob_id(payload.as_bytes());
        self.commits.insert(sha.clone(), tree);
        self.branches.insert(branch.to_string(), sha.clone());
        sha
    }
}

/// A [`RepositoryHost`] held entirely in memory.
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch at commit `revision`, sharing that commit's files if it
    /// is already known.
    pub fn with_branch(self, name: &str, revision: &str) -> Self {
        {
            let mut state = self.lock();
            state.commits.entry(revision.to_string()).or_default();
            state
                .branches
                .insert(name.to_string(), revision.to_string());
        }
        self
    }

    /// Place a file on `branch`'s current commit.
    pub fn with_file(self, branch: &str, path: &str, content: &[u8]) -> Self {
        let file = RemoteFile::from_bytes(path, git_blob_id(content), content);
        self.with_remote_file(branch, file)
    }

    /// Place an arbitrary [`RemoteFile`] on `branch`'s current commit.
    pub fn with_remote_file(self, branch: &str, file: RemoteFile) -> Self {
        {
            let mut state = self.lock();
            if let Some(sha) = state.branches.get(branch).cloned() {
                state
                    .commits
                    .entry(sha)
                    .or_default()
                    .insert(file.path.clone(), file);
            }
        }
        self
    }

    /// Make the next call of `operation` (trait method name) fail with `err`.
    pub fn fail_next(&self, operation: &'static str, err: RemoteError) {
        self.lock().fail_next.push((operation, err));
    }

    /// Make every `get_file` for `path` fail with a transport error.
    pub fn fail_path(&self, path: &str) {
        self.lock()
            .failing_paths
            .insert(path.to_string(), "connection reset".to_string());
    }

    /// Make every `get_branch` for `name` fail with a server error.
    pub fn fail_branch(&self, name: &str) {
        self.lock()
            .failing_branches
            .insert(name.to_string(), "server error".to_string());
    }

    /// Answer `add_reviewers` with [`RemoteError::Unprocessable`].
    pub fn reject_reviewers(&self) {
        self.lock().reject_reviewers = true;
    }

    pub fn branch(&self, name: &str) -> Option<Branch> {
        self.lock()
            .branches
            .get(name)
            .map(|sha| Branch::new(name, sha.as_str()))
    }

    pub fn file(&self, branch: &str, path: &str) -> Option<RemoteFile> {
        let state = self.lock();
        state.tip(branch).ok()?.1.get(path).cloned()
    }

    /// Decoded content of `path` on `branch`.
    pub fn file_bytes(&self, branch: &str, path: &str) -> Option<Vec<u8>> {
        self.file(branch, path)?.decoded().ok()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<HostCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn review_requests(&self) -> Vec<ReviewRequest> {
        self.lock().reviews.clone()
    }

    fn lock(&self) -> MutexGuard<'_, HostState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl RepositoryHost for MemoryHost {
    fn get_branch(&self, name: &str) -> Result<Option<Branch>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::GetBranch {
            name: name.to_string(),
        });
        state.take_failure("get_branch")?;
        if let Some(msg) = state.failing_branches.get(name) {
            return Err(RemoteError::Status {
                status: 500,
                message: msg.clone(),
            });
        }
        Ok(state
            .branches
            .get(name)
            .map(|sha| Branch::new(name, sha.as_str())))
    }

    fn create_branch(&self, name: &str, from: &RevisionMarker) -> Result<Branch, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::CreateBranch {
            name: name.to_string(),
            from: from.0.clone(),
        });
        state.take_failure("create_branch")?;
        if state.branches.contains_key(name) {
            return Err(RemoteError::Unprocessable {
                message: "Reference already exists".into(),
            });
        }
        if !state.commits.contains_key(&from.0) {
            return Err(RemoteError::Unprocessable {
                message: "Object does not exist".into(),
            });
        }
        state.branches.insert(name.to_string(), from.0.clone());
        Ok(Branch::new(name, from.clone()))
    }

    fn get_file(&self, branch: &str, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::GetFile {
            branch: branch.to_string(),
            path: path.to_string(),
        });
        state.take_failure("get_file")?;
        if let Some(msg) = state.failing_paths.get(path) {
            return Err(RemoteError::Transport(msg.clone()));
        }
        let (_, snapshot) = state.tip(branch)?;
        Ok(snapshot.get(path).cloned())
    }

    fn write_file(
        &self,
        branch: &str,
        item: &ChangeItem,
        message: &str,
    ) -> Result<CommitResult, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::WriteFile {
            branch: branch.to_string(),
            path: item.path.clone(),
            message: message.to_string(),
            prior: item.prior.as_ref().map(|p| p.0.clone()),
        });
        state.take_failure("write_file")?;

        let (parent, mut tree) = state.tip(branch)?;
        let current = tree.get(&item.path).map(|f| f.revision.clone());
        match (&item.prior, current) {
            (None, Some(_)) => {
                return Err(RemoteError::Unprocessable {
                    message: format!("\"sha\" wasn't supplied for {}", item.path),
                })
            }
            (Some(prior), current) if current.as_ref() != Some(prior) => {
                return Err(RemoteError::Status {
                    status: 409,
                    message: format!("{} does not match {prior}", item.path),
                })
            }
            _ => {}
        }

        tree.insert(
            item.path.clone(),
            RemoteFile::from_bytes(&item.path, git_blob_id(&item.content), &item.content),
        );
        let sha = state.commit(branch, &parent, message, tree);
        Ok(CommitResult { sha: sha.into() })
    }

    fn write_files_batch(
        &self,
        branch: &str,
        message: &str,
        items: &[ChangeItem],
    ) -> Result<CommitResult, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::WriteFilesBatch {
            branch: branch.to_string(),
            message: message.to_string(),
            paths: items.iter().map(|i| i.path.clone()).collect(),
        });
        state.take_failure("write_files_batch")?;

        let (parent, mut tree) = state.tip(branch)?;
        for item in items {
            tree.insert(
                item.path.clone(),
                RemoteFile::from_bytes(&item.path, git_blob_id(&item.content), &item.content),
            );
        }
        let sha = state.commit(branch, &parent, message, tree);
        Ok(CommitResult { sha: sha.into() })
    }

    fn create_review_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        description: &str,
    ) -> Result<ReviewRequestId, RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::CreateReviewRequest {
            base: base.to_string(),
            head: head.to_string(),
            title: title.to_string(),
        });
        state.take_failure("create_review_request")?;
        if base == head {
            return Err(RemoteError::Unprocessable {
                message: "head and base must differ".into(),
            });
        }
        state.reviews.push(ReviewRequest {
            base: base.to_string(),
            head: head.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            reviewers: Reviewers::default(),
        });
        Ok(ReviewRequestId(state.reviews.len() as u64))
    }

    fn add_reviewers(
        &self,
        id: ReviewRequestId,
        reviewers: &Reviewers,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.calls.push(HostCall::AddReviewers {
            id: id.0,
            reviewers: reviewers.clone(),
        });
        state.take_failure("add_reviewers")?;
        if state.reject_reviewers {
            return Err(RemoteError::Unprocessable {
                message: "Reviews may only be requested from collaborators.".into(),
            });
        }
        let index = (id.0 as usize).checked_sub(1);
        match index.and_then(|i| state.reviews.get_mut(i)) {
            Some(review) => {
                review.reviewers.users.extend(reviewers.users.iter().cloned());
                review.reviewers.teams.extend(reviewers.teams.iter().cloned());
                Ok(())
            }
            None => Err(RemoteError::Status {
                status: 404,
                message: format!("pull request {id} not found"),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryFiles
// ---------------------------------------------------------------------------

/// A [`LocalFiles`] tree held in memory. Entries may be marked unreadable.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiles {
    files: BTreeMap<PathBuf, Option<Vec<u8>>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), Some(content.into()));
        self
    }

    /// Listed, but every read fails with `PermissionDenied`.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.insert(path.into(), None);
        self
    }
}

impl LocalFiles for MemoryFiles {
    fn list(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let found: Vec<PathBuf> = self
            .files
            .keys()
            .filter_map(|p| p.strip_prefix(root).ok())
            .filter(|rel| !rel.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .collect();
        if found.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", root.display()),
            ));
        }
        Ok(found)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.files.get(path) {
            Some(Some(bytes)) => Ok(bytes.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("{} is not readable", path.display()),
            )),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }
}
