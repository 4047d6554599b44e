use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::auth::Secrets;
use crate::concurrency::ConcurrencyGuard;
use crate::context::InvocationContext;
use crate::pipeline::{Pipeline, PipelineStatus};
use crate::workflow::{self, InvocationReport, JobOutcome, JobStatus, PipelineMode, SkipReason};

/// Runs invocations end to end: concurrency registration, gating, and
/// ordered dispatch of both sites.
#[derive(Clone)]
pub struct Orchestrator {
    guard: ConcurrencyGuard,
    pipeline: Arc<dyn Pipeline>,
    secrets: Arc<Secrets>,
}

impl Orchestrator {
    pub fn new(pipeline: Arc<dyn Pipeline>, secrets: Secrets) -> Self {
        Self {
            guard: ConcurrencyGuard::new(),
            pipeline,
            secrets: Arc::new(secrets),
        }
    }

    #[cfg(test)]
    pub fn guard(&self) -> &ConcurrencyGuard {
        &self.guard
    }

    /// Run one invocation.
    ///
    /// `reference-benchmarks` runs first; `benchmarks` starts only once it has
    /// reached a terminal state and is skipped unless it succeeded. A newer
    /// invocation for the same ref cancels this one at any point.
    pub async fn invoke(&self, context: InvocationContext) -> InvocationReport {
        let lease = self.guard.register(&context.ref_id);
        let started_at = Utc::now();

        info!(
            "Invocation #{} for {} ({} event, {} labels)",
            lease.invocation_id(),
            context.ref_id,
            context.event,
            context.labels.len()
        );

        let mut jobs: Vec<JobOutcome> = Vec::with_capacity(PipelineMode::ALL.len());

        for mode in PipelineMode::ALL {
            let request = workflow::resolve(&context, mode);

            let dependency = mode
                .needs()
                .and_then(|needed| jobs.iter().find(|job| job.mode == needed));
            if let Some(blocked) = dependency.and_then(|dep| blocking_status(&dep.status)) {
                jobs.push(match blocked {
                    Blocked::Skip(reason) => {
                        info!("Skipping {mode}: {}", reason.describe());
                        JobOutcome::skipped(mode, reason, request)
                    }
                    Blocked::Cancelled => cancelled(mode, request),
                });
                continue;
            }

            let Some(request) = request else {
                info!("Skipping {mode}: gate closed");
                jobs.push(JobOutcome::skipped(mode, SkipReason::GateClosed, None));
                continue;
            };

            if lease.is_cancelled() {
                jobs.push(cancelled(mode, Some(request)));
                continue;
            }

            jobs.push(self.dispatch(mode, request, lease.token()).await);
        }

        let report = InvocationReport {
            invocation_id: lease.invocation_id(),
            concurrency_group: lease.key().to_string(),
            context,
            started_at,
            finished_at: Utc::now(),
            jobs,
        };

        info!(
            "Invocation #{} finished: {}",
            report.invocation_id,
            report
                .jobs
                .iter()
                .map(|job| format!("{}={}", job.mode, job.status.label()))
                .collect::<Vec<_>>()
                .join(", ")
        );

        report
    }

    async fn dispatch(
        &self,
        mode: PipelineMode,
        request: workflow::DispatchRequest,
        cancel: &CancellationToken,
    ) -> JobOutcome {
        let started_at = Utc::now();
        let result = self.pipeline.dispatch(&request, &self.secrets, cancel).await;

        let status = match result {
            Ok(PipelineStatus::Success) => JobStatus::Succeeded,
            Ok(PipelineStatus::Cancelled) => JobStatus::Cancelled,
            Ok(PipelineStatus::Failure { message }) => {
                warn!("{mode} failed: {message}");
                JobStatus::Failed { reason: message }
            }
            Err(e) => {
                warn!("{mode} could not be dispatched: {e}");
                JobStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        JobOutcome {
            mode,
            status,
            request: Some(request),
            started_at: Some(started_at),
            finished_at: Some(Utc::now()),
        }
    }
}

enum Blocked {
    Skip(SkipReason),
    Cancelled,
}

/// How a dependency's terminal state stops its dependents, if it does.
fn blocking_status(status: &JobStatus) -> Option<Blocked> {
    match status {
        JobStatus::Succeeded => None,
        JobStatus::Failed { .. } => Some(Blocked::Skip(SkipReason::DependencyFailed)),
        JobStatus::Skipped { .. } => Some(Blocked::Skip(SkipReason::DependencySkipped)),
        JobStatus::Cancelled => Some(Blocked::Cancelled),
    }
}

fn cancelled(mode: PipelineMode, request: Option<workflow::DispatchRequest>) -> JobOutcome {
    JobOutcome {
        mode,
        status: JobStatus::Cancelled,
        request,
        started_at: None,
        finished_at: None,
    }
}
