use std::fs;
use std::path::PathBuf;

use gitcopy_core::{
    AccessToken, ChangeItem, RepositoryRef, ReviewSettings, Reviewers, SyncConfig, SyncTarget,
};
use gitcopy_sync::{
    plan_changes, resolve_branches, run_sync,
    testing::{HostCall, MemoryFiles, MemoryHost},
    FileAction, FsLocalFiles, PlanMode, SourcePair,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn config(file: Option<SyncTarget>, directory: Option<SyncTarget>) -> SyncConfig {
    SyncConfig {
        repository: RepositoryRef::new("acme", "docs"),
        token: AccessToken::new("token"),
        api_url: "http://localhost".into(),
        reference_branch: "main".into(),
        working_branch: "working".into(),
        file,
        directory,
        review: ReviewSettings {
            title: "update docs".into(),
            description: "synced by CI".into(),
            reviewers: Reviewers::default(),
        },
        dry_run: false,
    }
}

fn target(source: impl Into<PathBuf>, destination: &str) -> Option<SyncTarget> {
    Some(SyncTarget {
        source: source.into(),
        destination: destination.into(),
    })
}

#[test]
fn new_branch_scenario_creates_file_and_opens_request() {
    init_logging();
    let host = MemoryHost::new().with_branch("main", "S1");
    let local = MemoryFiles::new().with_file("a.txt", "hello");
    let config = config(target("a.txt", "out/a.txt"), None);

    let report = run_sync(&host, &local, &config).expect("sync");

    assert!(host.branch("working").is_some());
    let calls = host.calls();
    assert!(calls.contains(&HostCall::CreateBranch {
        name: "working".into(),
        from: "S1".into(),
    }));
    assert_eq!(
        host.write_calls(),
        vec![HostCall::WriteFile {
            branch: "working".into(),
            path: "out/a.txt".into(),
            message: "out/a.txt file created".into(),
            prior: None,
        }]
    );
    assert_eq!(host.file_bytes("working", "out/a.txt").unwrap(), b"hello");

    let requests = host.review_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].head, "working");
    assert_eq!(requests[0].base, "main");
    assert_eq!(report.pull_request, Some(1));
    assert!(report.created_branch);
}

#[test]
fn identical_remote_file_yields_empty_change_set_and_no_write() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_file("main", "out/a.txt", b"hello");
    let local = MemoryFiles::new().with_file("a.txt", "hello");
    let config = config(target("a.txt", "out/a.txt"), None);

    let report = run_sync(&host, &local, &config).expect("sync");

    assert!(report.nothing_to_sync());
    assert_eq!(report.files[0].action, FileAction::Unchanged);
    assert!(host.write_calls().is_empty());
    assert!(host.review_requests().is_empty());
}

#[test]
fn second_run_is_idempotent() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_file("main", "public/keep.txt", b"keep");
    let local = MemoryFiles::new()
        .with_file("site/keep.txt", "keep")
        .with_file("site/new.txt", "new")
        .with_file("site/nested/deep.txt", "deep");
    let config = config(None, target("site", "public"));

    let first = run_sync(&host, &local, &config).expect("first run");
    assert_eq!(first.changed(), 2);
    let writes_after_first = host.write_calls().len();
    assert_eq!(writes_after_first, 1, "directory mode batches into one commit");

    let second = run_sync(&host, &local, &config).expect("second run");
    assert!(second.nothing_to_sync());
    assert!(!second.created_branch);
    assert_eq!(second.read_from, second.write_to);
    assert_eq!(host.write_calls().len(), writes_after_first);
    assert_eq!(host.review_requests().len(), 1, "no second request");
}

#[test]
fn unchanged_first_run_still_gets_a_request_when_changes_arrive() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_file("main", "out/a.txt", b"hello");
    let mut config = config(target("a.txt", "out/a.txt"), None);
    config.working_branch = "docs-sync".into();

    let unchanged = MemoryFiles::new().with_file("a.txt", "hello");
    let first = run_sync(&host, &unchanged, &config).expect("first run");
    assert!(first.nothing_to_sync());
    assert!(!first.created_branch);
    assert!(host.branch("docs-sync").is_none());

    let changed = MemoryFiles::new().with_file("a.txt", "hello again");
    let second = run_sync(&host, &changed, &config).expect("second run");
    assert!(second.created_branch);
    assert_eq!(second.commits.len(), 1);
    assert_eq!(second.pull_request, Some(1));
    assert_eq!(host.review_requests().len(), 1);
    assert_eq!(host.review_requests()[0].head, "docs-sync");
}

#[test]
fn reused_branch_never_requests_review() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_branch("working", "W1");
    let local = MemoryFiles::new().with_file("a.txt", "changed");
    let config = config(target("a.txt", "out/a.txt"), None);

    let report = run_sync(&host, &local, &config).expect("sync");

    assert_eq!(report.changed(), 1);
    assert_eq!(report.read_from, "working");
    assert!(report.pull_request.is_none());
    assert!(!host
        .calls()
        .iter()
        .any(|c| matches!(c, HostCall::CreateReviewRequest { .. })));
}

#[test]
fn reused_branch_reads_prior_synced_state() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_branch("working", "W1")
        .with_file("working", "out/a.txt", b"synced");
    let local = MemoryFiles::new().with_file("a.txt", "synced");
    let config = config(target("a.txt", "out/a.txt"), None);

    let report = run_sync(&host, &local, &config).expect("sync");
    assert!(report.nothing_to_sync());
    assert!(host.calls().contains(&HostCall::GetFile {
        branch: "working".into(),
        path: "out/a.txt".into(),
    }));
}

#[test]
fn directory_mode_skips_one_unreadable_file_of_five() {
    init_logging();
    let host = MemoryHost::new().with_branch("main", "S1");
    let local = MemoryFiles::new()
        .with_file("d/1.txt", "1")
        .with_file("d/2.txt", "2")
        .with_unreadable("d/3.txt")
        .with_file("d/4.txt", "4")
        .with_file("d/5.txt", "5");
    let config = config(None, target("d", "out"));

    let report = run_sync(&host, &local, &config).expect("run completes");

    assert_eq!(report.changed(), 4);
    assert_eq!(
        host.write_calls(),
        vec![HostCall::WriteFilesBatch {
            branch: "working".into(),
            message: "Batch update files in out".into(),
            paths: vec![
                "out/1.txt".into(),
                "out/2.txt".into(),
                "out/4.txt".into(),
                "out/5.txt".into(),
            ],
        }]
    );
    assert!(matches!(
        report.files[2].action,
        FileAction::Skipped { .. }
    ));
}

#[test]
fn create_and_update_markers_follow_remote_state() {
    init_logging();
    let host = MemoryHost::new()
        .with_branch("main", "S1")
        .with_file("main", "out/old.txt", b"v1");
    let marker = host.file("main", "out/old.txt").unwrap().revision;
    let local = MemoryFiles::new()
        .with_file("new.txt", "n")
        .with_file("old.txt", "v2");

    let branches = resolve_branches(&host, "main", "working").unwrap();
    let plan = plan_changes(
        &host,
        &local,
        &branches.read_from,
        &[
            SourcePair::new("new.txt", "out/new.txt"),
            SourcePair::new("old.txt", "out/old.txt"),
        ],
        PlanMode::Directory,
        "m",
    )
    .unwrap();

    assert_eq!(
        plan.changes.items(),
        &[
            ChangeItem::create("out/new.txt", b"n".to_vec()),
            ChangeItem::update("out/old.txt", b"v2".to_vec(), marker),
        ]
    );
}

#[test]
fn real_directory_with_dangling_symlink_still_syncs() {
    init_logging();
    let tmp = TempDir::new().expect("tempdir");
    let root = tmp.path().join("site");
    fs::create_dir_all(root.join("css")).unwrap();
    fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(root.join("css/site.css"), "h1{}").unwrap();
    #[cfg(unix)]
    std::os::unix::fs::symlink(root.join("missing"), root.join("broken")).unwrap();

    let host = MemoryHost::new().with_branch("main", "S1");
    let config = config(None, target(root.clone(), "public"));

    let report = run_sync(&host, &FsLocalFiles, &config).expect("sync");

    assert_eq!(report.changed(), 2);
    assert_eq!(
        host.file_bytes("working", "public/css/site.css").unwrap(),
        b"h1{}"
    );
    assert_eq!(
        host.file_bytes("working", "public/index.html").unwrap(),
        b"<h1>hi</h1>"
    );
}

#[test]
fn reviewers_rejected_does_not_fail_run() {
    init_logging();
    let host = MemoryHost::new().with_branch("main", "S1");
    host.reject_reviewers();
    let local = MemoryFiles::new().with_file("a.txt", "hello");
    let mut config = config(target("a.txt", "a.txt"), None);
    config.review.reviewers = Reviewers::parse(Some("stranger"), Some("nobody"));

    let report = run_sync(&host, &local, &config).expect("sync");
    assert_eq!(report.pull_request, Some(1));
    assert!(report.reviewers_rejected);
}
