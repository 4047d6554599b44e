use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Label object as returned by the REST API and embedded in event payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubLabel {
    pub name: String,
}

/// Pull request section of a webhook event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    /// Absent in trimmed payloads; the API is asked instead.
    #[serde(default)]
    pub labels: Option<Vec<GitHubLabel>>,
}

/// Subset of the file at `GITHUB_EVENT_PATH` that the gates care about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub pull_request: Option<PullRequestPayload>,
    /// Inputs of `workflow_call` and `workflow_dispatch` events.
    #[serde(default)]
    pub inputs: HashMap<String, serde_json::Value>,
}

impl EventPayload {
    /// String input by name. Non-string inputs are ignored.
    pub fn input(&self, name: &str) -> Option<String> {
        self.inputs
            .get(name)
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    }

    /// Label names carried by the payload, or `None` when it has no label list.
    pub fn label_names(&self) -> Option<Vec<String>> {
        self.pull_request
            .as_ref()
            .and_then(|pr| pr.labels.as_ref())
            .map(|labels| labels.iter().map(|l| l.name.clone()).collect())
    }

    pub fn pull_request_number(&self) -> Option<u64> {
        self.pull_request.as_ref().map(|pr| pr.number)
    }
}

/// Repository path in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPath {
    pub owner: String,
    pub repo: String,
}

impl RepoPath {
    pub fn parse(path: &str) -> Option<Self> {
        let parts: Vec<&str> = path.split('/').collect();
        match parts.as_slice() {
            [owner, repo] if !owner.is_empty() && !repo.is_empty() => Some(Self {
                owner: (*owner).to_string(),
                repo: (*repo).to_string(),
            }),
            _ => None,
        }
    }
}
