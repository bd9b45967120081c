//! Exercises [`GitCli`] against real repositories created with the system git
//! binary.

use std::path::{Path, PathBuf};

use gitloom_git::{GitCli, Vcs};
use time::macros::datetime;

async fn raw_git(cwd: &Path, args: &[&str]) -> String {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .await
        .expect("git should be runnable");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

async fn init_repo(dir: &Path) -> GitCli {
    let git = GitCli::new(dir);
    git.init().await.unwrap();
    git.set_identity("Test", "test@test.com").await.unwrap();
    git
}

#[tokio::test]
async fn commit_at_backdates_author_and_committer() {
    let tmp = tempfile::tempdir().unwrap();
    let git = init_repo(tmp.path()).await;

    std::fs::write(tmp.path().join("notes.md"), "hello").unwrap();
    git.stage(&tmp.path().join("notes.md")).await.unwrap();
    git.commit_at("Update notes.md", datetime!(2021-03-14 20:30:00 UTC))
        .await
        .unwrap();

    let log = raw_git(tmp.path(), &["log", "-1", "--format=%aI %cI %s"]).await;
    let log = log.trim();
    assert!(log.starts_with("2021-03-14T20:30:00"), "got: {log}");
    let committer = log.split_whitespace().nth(1).unwrap();
    assert!(committer.starts_with("2021-03-14T20:30:00"), "got: {log}");
    assert!(log.ends_with("Update notes.md"));
}

#[tokio::test]
async fn ignored_reports_only_excluded_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let git = init_repo(tmp.path()).await;

    std::fs::write(tmp.path().join(".gitignore"), "*.tmp\n").unwrap();
    std::fs::write(tmp.path().join("kept.rs"), "").unwrap();
    std::fs::write(tmp.path().join("scratch.tmp"), "").unwrap();

    let paths: Vec<PathBuf> = vec![tmp.path().join("kept.rs"), tmp.path().join("scratch.tmp")];
    let excluded = git.ignored(&paths).await.unwrap();
    assert_eq!(excluded, vec![tmp.path().join("scratch.tmp")]);
}

#[tokio::test]
async fn ignored_is_empty_when_nothing_matches() {
    let tmp = tempfile::tempdir().unwrap();
    let git = init_repo(tmp.path()).await;
    std::fs::write(tmp.path().join("a.rs"), "").unwrap();

    let excluded = git.ignored(&[tmp.path().join("a.rs")]).await.unwrap();
    assert!(excluded.is_empty());
}

#[tokio::test]
async fn push_to_local_bare_remote_succeeds() {
    let remote = tempfile::tempdir().unwrap();
    raw_git(remote.path(), &["init", "--bare"]).await;

    let tmp = tempfile::tempdir().unwrap();
    let git = init_repo(tmp.path()).await;
    std::fs::write(tmp.path().join("README.md"), "# demo\n").unwrap();
    git.stage(&tmp.path().join("README.md")).await.unwrap();
    git.commit_at("Initial commit", datetime!(2020-01-06 19:15:00 UTC))
        .await
        .unwrap();
    git.rename_branch("main").await.unwrap();
    git.add_origin(&remote.path().to_string_lossy()).await.unwrap();

    git.push_upstream("main").await.unwrap();
    // A second push of the same branch is a no-op, not an error.
    git.push("main").await.unwrap();

    let heads = raw_git(remote.path(), &["branch", "--list"]).await;
    assert!(heads.contains("main"));
}

#[tokio::test]
async fn push_without_remote_is_an_error_but_not_policy() {
    let tmp = tempfile::tempdir().unwrap();
    let git = init_repo(tmp.path()).await;
    std::fs::write(tmp.path().join("a.txt"), "x").unwrap();
    git.stage(&tmp.path().join("a.txt")).await.unwrap();
    git.commit_at("Update a.txt", datetime!(2022-06-01 21:00:00 UTC))
        .await
        .unwrap();

    let err = git.push("main").await.unwrap_err();
    assert!(!err.is_policy_rejection(), "unexpected policy class: {err}");
}
