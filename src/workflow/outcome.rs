use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::InvocationContext;

use super::request::DispatchRequest;
use super::site::PipelineMode;

/// Why a site never reached the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    GateClosed,
    DependencySkipped,
    DependencyFailed,
}

impl SkipReason {
    pub fn describe(self) -> &'static str {
        match self {
            SkipReason::GateClosed => "gate closed",
            SkipReason::DependencySkipped => "dependency skipped",
            SkipReason::DependencyFailed => "dependency failed",
        }
    }
}

/// Terminal state of one dispatch site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Succeeded,
    Failed { reason: String },
    Cancelled,
    Skipped { reason: SkipReason },
}

impl JobStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed { .. } => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Skipped { .. } => "skipped",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOutcome {
    pub mode: PipelineMode,
    #[serde(flatten)]
    pub status: JobStatus,
    /// Present whenever the gate was open, even if the site never ran.
    pub request: Option<DispatchRequest>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobOutcome {
    pub fn skipped(mode: PipelineMode, reason: SkipReason, request: Option<DispatchRequest>) -> Self {
        Self {
            mode,
            status: JobStatus::Skipped { reason },
            request,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn duration_secs(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            #[allow(clippy::cast_precision_loss)]
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}

/// Everything one invocation did, in site order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationReport {
    pub invocation_id: u64,
    pub concurrency_group: String,
    pub context: InvocationContext,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub jobs: Vec<JobOutcome>,
}

impl InvocationReport {
    pub fn job(&self, mode: PipelineMode) -> Option<&JobOutcome> {
        self.jobs.iter().find(|job| job.mode == mode)
    }

    pub fn has_failures(&self) -> bool {
        self.jobs.iter().any(|job| job.status.is_failure())
    }

    pub fn was_cancelled(&self) -> bool {
        self.jobs
            .iter()
            .any(|job| matches!(job.status, JobStatus::Cancelled))
    }
}
