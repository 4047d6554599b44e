use std::path::PathBuf;

use log::{debug, info};

use crate::auth::Token;
use crate::context::{InvocationContext, InvocationParameters, LabelSet, TriggerEvent};
use crate::error::{BenchGateError, Result};

use super::client::GitHubClient;
use super::types::{EventPayload, RepoPath};

/// Raw trigger inputs as gathered from flags and the Actions environment.
#[derive(Debug, Clone, Default)]
pub struct EventInputs {
    pub event: String,
    pub ref_id: String,
    pub labels: Vec<String>,
    pub ref_branch: Option<String>,
    pub branch: Option<String>,
    pub event_path: Option<PathBuf>,
    pub pr_number: Option<u64>,
    pub repo: Option<String>,
}

/// Builds an `InvocationContext` from GitHub Actions trigger data.
///
/// Labels come from, in order of preference: explicit inputs, the event
/// payload file, the REST API. Labels are only kept for pull request events.
pub struct GitHubEventSource {
    base_url: String,
    token: Option<Token>,
}

impl GitHubEventSource {
    pub fn new(base_url: String, token: Option<Token>) -> Self {
        Self { base_url, token }
    }

    /// # Errors
    ///
    /// Returns an error if the event payload cannot be read or parsed, if the
    /// repository path is malformed, or if the label request fails.
    pub async fn context(&self, inputs: EventInputs) -> Result<InvocationContext> {
        let event = TriggerEvent::from_name(&inputs.event);

        if inputs.ref_id.trim().is_empty() {
            return Err(BenchGateError::Config(
                "the triggering ref must not be empty".to_string(),
            ));
        }

        let payload = match &inputs.event_path {
            Some(path) => Some(load_payload(path)?),
            None => None,
        };

        let labels = if event.is_pull_request() {
            self.resolve_labels(&inputs, payload.as_ref()).await?
        } else {
            LabelSet::new()
        };

        let ref_branch = inputs
            .ref_branch
            .or_else(|| payload.as_ref().and_then(|p| p.input("ref_branch")));
        let branch = inputs
            .branch
            .or_else(|| payload.as_ref().and_then(|p| p.input("branch")));

        let context = InvocationContext::new(
            event,
            labels,
            inputs.ref_id,
            InvocationParameters::new(ref_branch, branch),
        );
        debug!("Resolved invocation context: {context:?}");

        Ok(context)
    }

    async fn resolve_labels(
        &self,
        inputs: &EventInputs,
        payload: Option<&EventPayload>,
    ) -> Result<LabelSet> {
        if !inputs.labels.is_empty() {
            return Ok(inputs.labels.iter().map(String::as_str).collect());
        }

        if let Some(names) = payload.and_then(EventPayload::label_names) {
            return Ok(names.into_iter().collect());
        }

        let pr_number = inputs
            .pr_number
            .or_else(|| payload.and_then(EventPayload::pull_request_number));

        match (pr_number, inputs.repo.as_deref()) {
            (Some(number), Some(repo)) => {
                let repo = RepoPath::parse(repo).ok_or_else(|| {
                    BenchGateError::Config("Repository must be in format 'owner/repo'".to_string())
                })?;
                info!("Fetching labels for {}/{}#{number}", repo.owner, repo.repo);
                let client = GitHubClient::new(&self.base_url, self.token.clone())?;
                client.fetch_pull_request_labels(&repo, number).await
            }
            _ => Ok(LabelSet::new()),
        }
    }
}

fn load_payload(path: &std::path::Path) -> Result<EventPayload> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| BenchGateError::EventPayload(format!("{}: {e}", path.display())))
}
