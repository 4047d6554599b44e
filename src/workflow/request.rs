use serde::{Deserialize, Serialize};

use crate::context::InvocationContext;

use super::gate;
use super::params::{resolve_branch, run_lightened_ci};
use super::site::{skip_ci_test_jobs, PipelineMode};

/// Parameter bundle handed to the reusable pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub branch: String,
    pub pipeline_mode: PipelineMode,
    pub run_lightened_ci: bool,
    /// Comma-separated job names, identical for every request.
    pub skip_ci_test_jobs: String,
}

/// Resolve the request a site would dispatch, or `None` when its gate is closed.
pub fn resolve(context: &InvocationContext, mode: PipelineMode) -> Option<DispatchRequest> {
    if !gate::is_open(&context.event, &context.labels, mode.required_label()) {
        return None;
    }

    Some(DispatchRequest {
        branch: resolve_branch(context, mode),
        pipeline_mode: mode,
        run_lightened_ci: run_lightened_ci(&context.event, &context.labels),
        skip_ci_test_jobs: skip_ci_test_jobs(),
    })
}

/// Requests for every site whose gate is open, in run order.
pub fn plan(context: &InvocationContext) -> Vec<DispatchRequest> {
    PipelineMode::ALL
        .into_iter()
        .filter_map(|mode| resolve(context, mode))
        .collect()
}
