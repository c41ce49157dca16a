use std::path::Path;
use std::time::Duration;

use lcsync::events::{CollectingSink, Level};
use lcsync::sync::{
    ConflictResolution, FetcherError, IgnorePolicy, OverwritePolicy, Pacing, SkipReason,
    SyncEngine, SyncError,
};
use lcsync_core::{LeetCodeClient, RetryPolicy};
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine(server: &MockServer, target: &Path) -> SyncEngine<LeetCodeClient> {
    let client = LeetCodeClient::with_base_url(&server.uri(), "test-session")
        .unwrap()
        .with_retry(RetryPolicy::fixed(2, Duration::from_millis(5)));
    SyncEngine::new(client, target).with_pacing(Pacing::none())
}

fn summary(id: u64, slug: &str, title: &str, lang: &str, status: &str) -> Value {
    json!({
        "id": id.to_string(),
        "title": title,
        "titleSlug": slug,
        "status": if status == "Accepted" { 10 } else { 11 },
        "statusDisplay": status,
        "lang": lang,
        "timestamp": "1700000000",
        "isPending": "Not Pending"
    })
}

async fn mount_page(server: &MockServer, submissions: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": { "offset": 0, "limit": 20 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "submissionList": {
                    "hasNext": false,
                    "lastKey": null,
                    "submissions": submissions
                }
            }
        })))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: u64, code: &str, difficulty: Value) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": { "submissionId": id }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "submissionDetails": {
                    "code": code,
                    "timestamp": 1700000000,
                    "statusCode": 10,
                    "lang": { "name": "python3", "verboseName": "Python3" },
                    "question": {
                        "questionId": "1",
                        "titleSlug": "ignored-here",
                        "title": "Ignored",
                        "difficulty": difficulty
                    }
                }
            }
        })))
        .mount(server)
        .await;
}

fn solution(target: &Path, folder: &str, file: &str) -> std::path::PathBuf {
    target.join("leetcodeProblems").join(folder).join(file)
}

#[tokio::test]
async fn saves_each_accepted_language_under_its_difficulty() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    mount_page(
        &server,
        vec![
            summary(3, "two-sum", "Two Sum", "java", "Accepted"),
            summary(2, "two-sum", "Two Sum", "python3", "Wrong Answer"),
            summary(1, "two-sum", "Two Sum", "python3", "Accepted"),
        ],
    )
    .await;
    mount_detail(&server, 3, "class Solution {}", json!("Easy")).await;
    mount_detail(&server, 1, "class Solution:\n    pass", json!("Easy")).await;

    let sink = CollectingSink::new();
    let report = engine(&server, target.path())
        .run(&mut IgnorePolicy, &sink)
        .await
        .unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.new, 2);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.resolution, None);
    assert_eq!(report.saved_count(), 2);

    let python = std::fs::read_to_string(solution(target.path(), "easy", "two-sum.py")).unwrap();
    assert!(python.starts_with("\"\"\"\nLeetCode Problem: Two Sum\nDifficulty: Easy\n"));
    assert!(python.contains("Link: https://leetcode.com/problems/two-sum"));
    assert!(python.ends_with("class Solution:\n    pass"));

    let java = std::fs::read_to_string(solution(target.path(), "easy", "two-sum.java")).unwrap();
    assert!(java.starts_with("/**\n * LeetCode Problem: Two Sum\n"));
    assert!(java.ends_with("class Solution {}"));

    assert!(sink.at_level(Level::Error).is_empty());
}

#[tokio::test]
async fn second_run_with_ignore_changes_nothing() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    mount_page(
        &server,
        vec![summary(1, "two-sum", "Two Sum", "python3", "Accepted")],
    )
    .await;
    mount_detail(&server, 1, "print(1)", json!("Easy")).await;

    let engine = engine(&server, target.path());
    let first = engine.run(&mut IgnorePolicy, &CollectingSink::new()).await.unwrap();
    assert_eq!(first.saved_count(), 1);
    let file = solution(target.path(), "easy", "two-sum.py");
    let before = std::fs::read(&file).unwrap();

    let second = engine.run(&mut IgnorePolicy, &CollectingSink::new()).await.unwrap();
    assert_eq!(second.existing, 1);
    assert_eq!(second.new, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(second.resolution, Some(ConflictResolution::Ignore));
    assert_eq!(second.ignored_duplicates(), 1);
    assert_eq!(second.saved_count(), 0);
    assert_eq!(std::fs::read(&file).unwrap(), before);
}

#[tokio::test]
async fn ignore_keeps_duplicates_and_overwrite_replaces_them() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();
    let existing = solution(target.path(), "easy", "two-sum.py");
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, "old approach").unwrap();

    mount_page(
        &server,
        vec![
            summary(2, "two-sum", "Two Sum", "python3", "Accepted"),
            summary(1, "lru-cache", "LRU Cache", "python3", "Accepted"),
        ],
    )
    .await;
    mount_detail(&server, 2, "new approach", json!("Easy")).await;
    mount_detail(&server, 1, "cache = {}", json!("Medium")).await;

    let engine = engine(&server, target.path());
    let report = engine.run(&mut IgnorePolicy, &CollectingSink::new()).await.unwrap();
    assert_eq!(report.new, 1);
    assert_eq!(report.duplicates, 1);
    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "old approach");
    assert!(solution(target.path(), "medium", "lru-cache.py").exists());

    let report = engine.run(&mut OverwritePolicy, &CollectingSink::new()).await.unwrap();
    assert_eq!(report.resolution, Some(ConflictResolution::Overwrite));
    assert_eq!(report.saved_count(), 2);
    assert!(std::fs::read_to_string(&existing).unwrap().ends_with("new approach"));
}

#[tokio::test]
async fn submission_without_code_is_never_written() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    mount_page(
        &server,
        vec![summary(1, "two-sum", "Two Sum", "python3", "Accepted")],
    )
    .await;
    mount_detail(&server, 1, "", json!("Easy")).await;

    let sink = CollectingSink::new();
    let report = engine(&server, target.path())
        .run(&mut OverwritePolicy, &sink)
        .await
        .unwrap();

    assert_eq!(report.saved_count(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingField("code"));
    assert_eq!(report.warnings().count(), 1);
    assert!(!solution(target.path(), "easy", "two-sum.py").exists());
    assert!(!sink.at_level(Level::Warn).is_empty());
}

#[tokio::test]
async fn failed_detail_fetch_drops_the_submission() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    mount_page(
        &server,
        vec![summary(1, "two-sum", "Two Sum", "python3", "Accepted")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({
            "variables": { "submissionId": 1 }
        })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = engine(&server, target.path())
        .run(&mut IgnorePolicy, &CollectingSink::new())
        .await
        .unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.saved_count(), 0);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingField("code"));
}

#[tokio::test]
async fn expired_session_aborts_the_run() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let err = engine(&server, target.path())
        .run(&mut OverwritePolicy, &CollectingSink::new())
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert!(err.to_string().contains("LEETCODE_SESSION"));
    assert!(!target.path().join("leetcodeProblems").exists());
}

#[tokio::test]
async fn unknown_difficulty_lands_in_medium() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    mount_page(
        &server,
        vec![summary(1, "mystery", "Mystery", "rust", "Accepted")],
    )
    .await;
    mount_detail(&server, 1, "fn main() {}", Value::Null).await;

    let report = engine(&server, target.path())
        .run(&mut IgnorePolicy, &CollectingSink::new())
        .await
        .unwrap();

    assert_eq!(report.saved_count(), 1);
    let content =
        std::fs::read_to_string(solution(target.path(), "medium", "mystery.rs")).unwrap();
    assert!(content.starts_with("/**\n * LeetCode Problem: Mystery\n * Difficulty: Unknown"));
}

#[tokio::test]
async fn index_counts_existing_solutions_per_folder() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();
    for (folder, file) in [("easy", "two-sum.py"), ("easy", "two-sum.java"), ("hard", "n-queens.cpp")] {
        let path = solution(target.path(), folder, file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "x").unwrap();
    }

    let index = engine(&server, target.path()).local_index().await.unwrap();
    assert_eq!(index.len(), 2);
    assert!(index.contains("two-sum"));
    assert!(index.contains("n-queens"));
    assert_eq!(index.per_folder(), &[("easy", 2), ("medium", 0), ("hard", 1)]);
}

#[tokio::test]
async fn overwrite_moves_solution_when_difficulty_changes() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();
    let stale = solution(target.path(), "medium", "two-sum.py");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, "old").unwrap();

    mount_page(
        &server,
        vec![summary(1, "two-sum", "Two Sum", "python3", "Accepted")],
    )
    .await;
    mount_detail(&server, 1, "print(2)", json!("Easy")).await;

    let engine = engine(&server, target.path());
    let report = engine.run(&mut OverwritePolicy, &CollectingSink::new()).await.unwrap();

    assert_eq!(report.duplicates, 1);
    assert_eq!(report.written, vec![solution(target.path(), "easy", "two-sum.py")]);
    assert!(!stale.exists());
    let index = engine.local_index().await.unwrap();
    assert_eq!(index.per_folder(), &[("easy", 1), ("medium", 0), ("hard", 0)]);
}

#[cfg(unix)]
#[tokio::test]
async fn write_failure_fails_only_that_submission() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();
    // A directory where the partial file would go makes the create fail.
    std::fs::create_dir_all(solution(target.path(), "easy", "two-sum.py.partial")).unwrap();

    mount_page(
        &server,
        vec![
            summary(2, "two-sum", "Two Sum", "python3", "Accepted"),
            summary(1, "lru-cache", "LRU Cache", "python3", "Accepted"),
        ],
    )
    .await;
    mount_detail(&server, 2, "print(1)", json!("Easy")).await;
    mount_detail(&server, 1, "cache = {}", json!("Medium")).await;

    let sink = CollectingSink::new();
    let report = engine(&server, target.path())
        .run(&mut IgnorePolicy, &sink)
        .await
        .unwrap();

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].title_slug, "two-sum");
    assert_eq!(report.written, vec![solution(target.path(), "medium", "lru-cache.py")]);
    assert!(!solution(target.path(), "easy", "two-sum.py").exists());
    assert_eq!(sink.at_level(Level::Error).len(), 1);
}

#[tokio::test]
async fn unavailable_remote_aborts_the_run() {
    let server = MockServer::start().await;
    let target = tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let err = engine(&server, target.path())
        .run(&mut OverwritePolicy, &CollectingSink::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::Fetch(FetcherError::Remote { offset: 0, .. })
    ));
    assert!(!err.is_session_expired());
    assert!(!target.path().join("leetcodeProblems").join("easy").exists());
    assert!(!target.path().join("leetcodeProblems").join("medium").exists());
}
