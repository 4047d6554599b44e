use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

use crate::context::{InvocationContext, InvocationParameters, LabelSet, TriggerEvent};
use crate::orchestrator::Orchestrator;
use crate::workflow::InvocationReport;

/// One recorded trigger to feed through the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReplayEntry {
    pub event: TriggerEvent,
    #[serde(rename = "ref")]
    pub ref_id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub ref_branch: Option<String>,
    pub branch: Option<String>,
    /// Delay before this trigger fires, measured from the start of the replay
    #[serde(default)]
    pub delay_ms: u64,
}

impl ReplayEntry {
    pub fn context(&self) -> InvocationContext {
        let labels = if self.event.is_pull_request() {
            self.labels.iter().map(String::as_str).collect()
        } else {
            LabelSet::new()
        };

        InvocationContext::new(
            self.event.clone(),
            labels,
            self.ref_id.clone(),
            InvocationParameters::new(self.ref_branch.clone(), self.branch.clone()),
        )
    }
}

/// Load a replay file. YAML is accepted, and JSON as its subset.
pub fn load_entries(path: &Path) -> Result<Vec<ReplayEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay file: {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse replay file: {}", path.display()))
}

/// Fire every entry at its delay through one shared orchestrator and collect
/// the reports in entry order.
pub async fn run(orchestrator: &Orchestrator, entries: Vec<ReplayEntry>) -> Result<Vec<InvocationReport>> {
    info!("Replaying {} invocations", entries.len());

    let handles: Vec<_> = entries
        .into_iter()
        .map(|entry| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                if entry.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(entry.delay_ms)).await;
                }
                orchestrator.invoke(entry.context()).await
            })
        })
        .collect();

    futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.context("Replayed invocation panicked"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Secrets;
    use crate::error;
    use crate::pipeline::{Pipeline, PipelineStatus};
    use crate::workflow::{DispatchRequest, JobStatus, PipelineMode};
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;
    use tokio_util::sync::CancellationToken;

    const REF: &str = "refs/heads/master";

    /// Holds every dispatch until it is cancelled or the latch opens.
    struct LatchedPipeline {
        latch: CancellationToken,
    }

    #[async_trait]
    impl Pipeline for LatchedPipeline {
        async fn dispatch(
            &self,
            _request: &DispatchRequest,
            _secrets: &Secrets,
            cancel: &CancellationToken,
        ) -> error::Result<PipelineStatus> {
            tokio::select! {
                biased;
                () = cancel.cancelled() => Ok(PipelineStatus::Cancelled),
                () = self.latch.cancelled() => Ok(PipelineStatus::Success),
            }
        }
    }

    #[test]
    fn test_load_yaml_entries() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        write!(
            file,
            r#"
- event: pull_request
  ref: refs/pull/5/merge
  labels: ["ci:run-benchmarks"]
  branch: bar
- event: schedule
  ref: refs/heads/master
  labels: ["ci:run-benchmarks"]
  delay-ms: 250
"#
        )
        .unwrap();

        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, TriggerEvent::PullRequest);
        assert_eq!(entries[0].context().params.branch.as_deref(), Some("bar"));
        assert_eq!(entries[1].delay_ms, 250);
        assert!(entries[1].context().labels.is_empty());
    }

    #[test]
    fn test_load_json_entries() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(file, r#"[{{"event": "push", "ref": "refs/heads/main"}}]"#).unwrap();

        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries[0].event, TriggerEvent::Other("push".to_string()));
    }

    #[tokio::test]
    async fn test_same_ref_leaves_one_survivor() {
        let latch = CancellationToken::new();
        let orchestrator = Orchestrator::new(
            Arc::new(LatchedPipeline {
                latch: latch.clone(),
            }),
            Secrets::default(),
        );

        let entry = |delay_ms| ReplayEntry {
            event: TriggerEvent::Schedule,
            ref_id: REF.to_string(),
            labels: vec![],
            ref_branch: None,
            branch: None,
            delay_ms,
        };

        let replay = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move { run(&orchestrator, vec![entry(0), entry(50)]).await })
        };

        tokio::time::timeout(Duration::from_secs(5), async {
            while orchestrator.guard().holder(REF) != Some(2) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("second replayed invocation never registered");
        latch.cancel();

        let reports = replay.await.unwrap().unwrap();

        assert!(reports[0].was_cancelled());
        assert!(!reports[1].was_cancelled());
        assert_eq!(
            reports[1].job(PipelineMode::Benchmarks).unwrap().status,
            JobStatus::Succeeded
        );
        assert_eq!(orchestrator.guard().active_groups(), 0);
    }
}
