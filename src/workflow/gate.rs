use crate::context::{LabelSet, TriggerEvent};

/// Whether a dispatch site may run for this trigger.
///
/// Scheduled runs always pass. Pull requests pass only when labelled with
/// `required_label`. Every other event keeps the gate closed, which means the
/// site is skipped rather than failed.
pub fn is_open(event: &TriggerEvent, labels: &LabelSet, required_label: &str) -> bool {
    match event {
        TriggerEvent::Schedule => true,
        TriggerEvent::PullRequest => labels.contains(required_label),
        TriggerEvent::WorkflowCall | TriggerEvent::Other(_) => false,
    }
}
