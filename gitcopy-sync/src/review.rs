//! Opens the pull request for a freshly created working branch.

use gitcopy_core::{RemoteError, RepositoryHost, ReviewRequest, ReviewRequestId, ReviewSettings};

use crate::branch::ResolvedBranches;
use crate::error::{remote_err, SyncError};

/// Outcome of [`request_review`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The working branch was reused; no request was made.
    Skipped,
    Opened {
        id: ReviewRequestId,
        /// The host refused one or more reviewers as non-collaborators.
        reviewers_rejected: bool,
    },
}

/// Build the request for `branches`: working branch into the reference.
pub fn build_request(branches: &ResolvedBranches, settings: &ReviewSettings) -> ReviewRequest {
    ReviewRequest {
        base: branches.reference.name.clone(),
        head: branches.write_to.clone(),
        title: settings.title.clone(),
        description: settings.description.clone(),
        reviewers: settings.reviewers.clone(),
    }
}

/// Open a review request unless the working branch was reused.
///
/// Reviewers are attached in a follow-up call; a 422 for them is logged and
/// tolerated since the request itself already stands.
pub fn request_review(
    host: &dyn RepositoryHost,
    branches: &ResolvedBranches,
    settings: &ReviewSettings,
) -> Result<ReviewOutcome, SyncError> {
    if branches.is_reuse() {
        tracing::info!(
            "branch '{}' was reused; not opening a pull request",
            branches.write_to
        );
        return Ok(ReviewOutcome::Skipped);
    }

    let request = build_request(branches, settings);
    let id = host
        .create_review_request(
            &request.base,
            &request.head,
            &request.title,
            &request.description,
        )
        .map_err(|e| remote_err("create pull request", e))?;
    tracing::info!(
        "opened pull request {id}: {} -> {}",
        request.head,
        request.base
    );

    if request.reviewers.is_empty() {
        return Ok(ReviewOutcome::Opened {
            id,
            reviewers_rejected: false,
        });
    }

    match host.add_reviewers(id, &request.reviewers) {
        Ok(()) => Ok(ReviewOutcome::Opened {
            id,
            reviewers_rejected: false,
        }),
        Err(RemoteError::Unprocessable { message }) => {
            tracing::warn!("reviewers are not collaborators: {message}");
            Ok(ReviewOutcome::Opened {
                id,
                reviewers_rejected: true,
            })
        }
        Err(e) => Err(remote_err(format!("add reviewers to {id}"), e)),
    }
}

#[cfg(test)]
mod tests {
    use gitcopy_core::{Branch, Reviewers};

    use crate::testing::{HostCall, MemoryHost};

    use super::*;

    fn created() -> ResolvedBranches {
        ResolvedBranches {
            reference: Branch::new("main", "S1"),
            read_from: "main".into(),
            write_to: "work".into(),
            created_new: true,
        }
    }

    fn settings(reviewers: Reviewers) -> ReviewSettings {
        ReviewSettings {
            title: "Sync docs".into(),
            description: "automated".into(),
            reviewers,
        }
    }

    #[test]
    fn reused_branch_makes_no_calls() {
        let host = MemoryHost::new();
        let reused = ResolvedBranches {
            reference: Branch::new("main", "S1"),
            read_from: "work".into(),
            write_to: "work".into(),
            created_new: false,
        };
        let outcome = request_review(&host, &reused, &settings(Reviewers::default())).unwrap();
        assert_eq!(outcome, ReviewOutcome::Skipped);
        assert!(host.calls().is_empty());
    }

    #[test]
    fn opens_request_from_working_into_reference() {
        let host = MemoryHost::new();
        let outcome = request_review(&host, &created(), &settings(Reviewers::default())).unwrap();

        assert!(matches!(
            outcome,
            ReviewOutcome::Opened {
                reviewers_rejected: false,
                ..
            }
        ));
        assert_eq!(
            host.calls(),
            vec![HostCall::CreateReviewRequest {
                base: "main".into(),
                head: "work".into(),
                title: "Sync docs".into(),
            }]
        );
    }

    #[test]
    fn reviewers_are_attached_in_follow_up_call() {
        let host = MemoryHost::new();
        let reviewers = Reviewers::parse(Some("alice,alice"), Some("docs-team"));
        request_review(&host, &created(), &settings(reviewers.clone())).unwrap();

        let requests = host.review_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].reviewers.users, vec!["alice", "alice"]);
        assert_eq!(requests[0].reviewers.teams, vec!["docs-team"]);
        assert!(host
            .calls()
            .contains(&HostCall::AddReviewers { id: 1, reviewers }));
    }

    #[test]
    fn rejected_reviewers_are_tolerated() {
        let host = MemoryHost::new();
        host.reject_reviewers();
        let outcome = request_review(
            &host,
            &created(),
            &settings(Reviewers::parse(Some("outsider"), None)),
        )
        .unwrap();
        assert_eq!(
            outcome,
            ReviewOutcome::Opened {
                id: ReviewRequestId(1),
                reviewers_rejected: true,
            }
        );
    }

    #[test]
    fn other_reviewer_failures_are_fatal() {
        let host = MemoryHost::new();
        host.fail_next(
            "add_reviewers",
            RemoteError::Status {
                status: 500,
                message: "boom".into(),
            },
        );
        let err = request_review(
            &host,
            &created(),
            &settings(Reviewers::parse(Some("alice"), None)),
        )
        .unwrap_err();
        assert!(err.to_string().contains("add reviewers to #1 failed"));
    }
}
