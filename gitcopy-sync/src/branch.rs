//! Branch resolution: reuse the working branch or cut it from the reference.

use gitcopy_core::{Branch, RepositoryHost};

use crate::error::{remote_err, SyncError};

/// Which branch to read existing content from and which to write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranches {
    /// The reference branch as found on the host.
    pub reference: Branch,
    pub read_from: String,
    pub write_to: String,
    /// `true` when the working branch did not exist before this run.
    pub created_new: bool,
}

impl ResolvedBranches {
    /// The working branch already existed and is being written in place.
    pub fn is_reuse(&self) -> bool {
        self.read_from == self.write_to
    }
}

/// Look up the reference and working branches. Nothing is created here.
///
/// An existing working branch is used as both `read_from` and `write_to`.
/// Otherwise planning reads from the reference and the working branch is
/// left for [`create_working_branch`], once there is something to write.
pub fn resolve_branches(
    host: &dyn RepositoryHost,
    reference: &str,
    working: &str,
) -> Result<ResolvedBranches, SyncError> {
    let reference_branch = host
        .get_branch(reference)
        .map_err(|e| remote_err(format!("get branch '{reference}'"), e))?
        .ok_or_else(|| SyncError::ReferenceNotFound {
            branch: reference.to_string(),
        })?;

    let existing = host
        .get_branch(working)
        .map_err(|e| remote_err(format!("get branch '{working}'"), e))?;

    if existing.is_some() {
        tracing::info!("reusing existing branch '{working}'");
        return Ok(ResolvedBranches {
            reference: reference_branch,
            read_from: working.to_string(),
            write_to: working.to_string(),
            created_new: false,
        });
    }

    Ok(ResolvedBranches {
        read_from: reference.to_string(),
        write_to: working.to_string(),
        reference: reference_branch,
        created_new: true,
    })
}

/// Cut the working branch from the reference tip if it does not exist yet.
pub fn create_working_branch(
    host: &dyn RepositoryHost,
    branches: &ResolvedBranches,
) -> Result<(), SyncError> {
    if !branches.created_new {
        return Ok(());
    }
    let working = &branches.write_to;
    host.create_branch(working, &branches.reference.revision)
        .map_err(|e| remote_err(format!("create branch '{working}'"), e))?;
    tracing::info!(
        "created branch '{working}' from '{}' at {}",
        branches.reference.name,
        branches.reference.revision
    );
    Ok(())
}
