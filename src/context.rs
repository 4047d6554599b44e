use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Event that triggered an invocation.
///
/// Only the three named tags can open a gate; every other event name the
/// platform delivers is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    PullRequest,
    WorkflowCall,
    Schedule,
    Other(String),
}

impl TriggerEvent {
    pub fn as_str(&self) -> &str {
        match self {
            TriggerEvent::PullRequest => "pull_request",
            TriggerEvent::WorkflowCall => "workflow_call",
            TriggerEvent::Schedule => "schedule",
            TriggerEvent::Other(name) => name,
        }
    }

    /// Map a platform event name onto a trigger.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "pull_request" => TriggerEvent::PullRequest,
            "workflow_call" => TriggerEvent::WorkflowCall,
            "schedule" => TriggerEvent::Schedule,
            other => TriggerEvent::Other(other.to_string()),
        }
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(self, TriggerEvent::PullRequest)
    }
}

impl FromStr for TriggerEvent {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TriggerEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TriggerEvent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Labels attached to a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Optional branch overrides supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationParameters {
    pub ref_branch: Option<String>,
    pub branch: Option<String>,
}

impl InvocationParameters {
    pub fn new(ref_branch: Option<String>, branch: Option<String>) -> Self {
        Self {
            ref_branch: non_empty(ref_branch),
            branch: non_empty(branch),
        }
    }
}

/// Everything one invocation knows about its trigger. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationContext {
    pub event: TriggerEvent,
    pub labels: LabelSet,
    pub ref_id: String,
    pub params: InvocationParameters,
}

impl InvocationContext {
    pub fn new(
        event: TriggerEvent,
        labels: LabelSet,
        ref_id: impl Into<String>,
        params: InvocationParameters,
    ) -> Self {
        Self {
            event,
            labels,
            ref_id: ref_id.into(),
            params,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
