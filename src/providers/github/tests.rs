use std::io::Write;

use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

use super::client::GitHubClient;
use super::types::RepoPath;
use super::{EventInputs, GitHubEventSource};
use crate::auth::Token;
use crate::context::TriggerEvent;
use crate::error::BenchGateError;

fn inputs(event: &str) -> EventInputs {
    EventInputs {
        event: event.to_string(),
        ref_id: "refs/pull/7/merge".to_string(),
        ..Default::default()
    }
}

fn payload_file(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{json}").unwrap();
    file
}

#[test]
fn test_repo_path_parsing() {
    let repo = RepoPath::parse("PennyLaneAI/pennylane").unwrap();
    assert_eq!(repo.owner, "PennyLaneAI");
    assert_eq!(repo.repo, "pennylane");

    assert!(RepoPath::parse("invalid-path").is_none());
    assert!(RepoPath::parse("owner/repo/extra").is_none());
    assert!(RepoPath::parse("/repo").is_none());
}

#[tokio::test]
async fn test_fetch_pull_request_labels() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/owner/repo/issues/7/labels")
        .match_query(mockito::Matcher::Any)
        .match_header("authorization", "Bearer gh-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "ci:run-benchmarks"}, {"name": "documentation"}]"#)
        .create_async()
        .await;

    let client = GitHubClient::new(&server.url(), Some(Token::from("gh-token"))).unwrap();
    let repo = RepoPath::parse("owner/repo").unwrap();
    let labels = assert_ok!(client.fetch_pull_request_labels(&repo, 7).await);

    mock.assert_async().await;
    assert_eq!(labels.len(), 2);
    assert!(labels.contains("ci:run-benchmarks"));
}

#[tokio::test]
async fn test_fetch_labels_surfaces_api_errors() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/repos/owner/repo/issues/7/labels")
        .match_query(mockito::Matcher::Any)
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create_async()
        .await;

    let client = GitHubClient::new(&server.url(), None).unwrap();
    let repo = RepoPath::parse("owner/repo").unwrap();
    let err = assert_err!(client.fetch_pull_request_labels(&repo, 7).await);

    assert!(matches!(err, BenchGateError::ApiError { status: 404, .. }));
}

#[test]
fn test_invalid_base_url_is_config_error() {
    let result = GitHubClient::new("not a url", None);
    assert!(matches!(result, Err(BenchGateError::Config(_))));
}

#[tokio::test]
async fn test_context_from_explicit_labels() {
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("pull_request");
    inputs.labels = vec!["ci:run-benchmarks".to_string()];
    inputs.branch = Some("bar".to_string());

    let ctx = assert_ok!(source.context(inputs).await);
    assert_eq!(ctx.event, TriggerEvent::PullRequest);
    assert!(ctx.labels.contains("ci:run-benchmarks"));
    assert_eq!(ctx.params.branch.as_deref(), Some("bar"));
    assert_eq!(ctx.ref_id, "refs/pull/7/merge");
}

#[tokio::test]
async fn test_context_reads_event_payload() {
    let file = payload_file(
        r#"{
  "pull_request": {
    "number": 7,
    "labels": [{"name": "ci:run-benchmarks"}, {"name": "ci:run-full-test-suite"}]
  }
}"#,
    );
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("pull_request");
    inputs.event_path = Some(file.path().to_path_buf());

    let ctx = assert_ok!(source.context(inputs).await);
    assert_eq!(ctx.labels.len(), 2);
    assert!(ctx.labels.contains("ci:run-full-test-suite"));
}

#[tokio::test]
async fn test_context_reads_call_inputs_from_payload() {
    let file = payload_file(r#"{"inputs": {"ref_branch": "foo", "branch": ""}}"#);
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("workflow_call");
    inputs.event_path = Some(file.path().to_path_buf());

    let ctx = assert_ok!(source.context(inputs).await);
    assert_eq!(ctx.params.ref_branch.as_deref(), Some("foo"));
    assert!(ctx.params.branch.is_none());
}

#[tokio::test]
async fn test_context_fetches_labels_when_payload_has_none() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/owner/repo/issues/7/labels")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "ci:run-benchmarks"}]"#)
        .create_async()
        .await;

    let source = GitHubEventSource::new(server.url(), None);
    let mut inputs = inputs("pull_request");
    inputs.pr_number = Some(7);
    inputs.repo = Some("owner/repo".to_string());

    let ctx = assert_ok!(source.context(inputs).await);
    mock.assert_async().await;
    assert!(ctx.labels.contains("ci:run-benchmarks"));
}

#[tokio::test]
async fn test_context_takes_pr_number_from_payload_without_labels() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/owner/repo/issues/12/labels")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"name": "ci:run-benchmarks"}, {"name": "docs"}]"#)
        .create_async()
        .await;

    let file = payload_file(r#"{"pull_request": {"number": 12}}"#);
    let source = GitHubEventSource::new(server.url(), None);
    let mut inputs = inputs("pull_request");
    inputs.event_path = Some(file.path().to_path_buf());
    inputs.repo = Some("owner/repo".to_string());

    let ctx = assert_ok!(source.context(inputs).await);
    mock.assert_async().await;
    assert_eq!(ctx.labels.len(), 2);
    assert!(ctx.labels.contains("ci:run-benchmarks"));
}

#[tokio::test]
async fn test_context_keeps_empty_payload_label_list() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/repos/owner/repo/issues/12/labels")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let file = payload_file(r#"{"pull_request": {"number": 12, "labels": []}}"#);
    let source = GitHubEventSource::new(server.url(), None);
    let mut inputs = inputs("pull_request");
    inputs.event_path = Some(file.path().to_path_buf());
    inputs.repo = Some("owner/repo".to_string());

    let ctx = assert_ok!(source.context(inputs).await);
    mock.assert_async().await;
    assert!(ctx.labels.is_empty());
}

#[tokio::test]
async fn test_non_pull_request_events_drop_labels() {
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("schedule");
    inputs.labels = vec!["ci:run-full-test-suite".to_string()];

    let ctx = assert_ok!(source.context(inputs).await);
    assert_eq!(ctx.event, TriggerEvent::Schedule);
    assert!(ctx.labels.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let file = payload_file("{ not json");
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("pull_request");
    inputs.event_path = Some(file.path().to_path_buf());

    let err = assert_err!(source.context(inputs).await);
    assert!(matches!(err, BenchGateError::EventPayload(_)));
}

#[tokio::test]
async fn test_empty_ref_is_rejected() {
    let source = GitHubEventSource::new("https://api.github.com".to_string(), None);
    let mut inputs = inputs("schedule");
    inputs.ref_id = String::new();

    assert_err!(source.context(inputs).await);
}
