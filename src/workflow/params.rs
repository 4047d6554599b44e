use crate::context::{InvocationContext, LabelSet, TriggerEvent};

use super::site::{PipelineMode, DEFAULT_REF_BRANCH, FULL_TEST_SUITE_LABEL};

/// Branch the given site benchmarks.
///
/// The baseline site falls back to a fixed branch; the comparison site falls
/// back to the ref that triggered the invocation.
pub fn resolve_branch(context: &InvocationContext, mode: PipelineMode) -> String {
    match mode {
        PipelineMode::ReferenceBenchmarks => context
            .params
            .ref_branch
            .clone()
            .unwrap_or_else(|| DEFAULT_REF_BRANCH.to_string()),
        PipelineMode::Benchmarks => context
            .params
            .branch
            .clone()
            .unwrap_or_else(|| context.ref_id.clone()),
    }
}

/// Lightened runs only happen for pull requests that did not ask for the
/// full suite. Scheduled and called runs always get the full suite.
pub fn run_lightened_ci(event: &TriggerEvent, labels: &LabelSet) -> bool {
    event.is_pull_request() && !labels.contains(FULL_TEST_SUITE_LABEL)
}
