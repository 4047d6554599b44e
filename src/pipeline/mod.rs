//! The reusable pipeline a dispatch hands its request to.

mod command;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::auth::Secrets;
use crate::error::Result;
use crate::workflow::DispatchRequest;

pub use command::CommandPipeline;

/// Terminal state reported by the external pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineStatus {
    Success,
    Failure { message: String },
    Cancelled,
}

/// External executor of benchmark runs.
///
/// Implementations must return `PipelineStatus::Cancelled` promptly once
/// `cancel` fires. An `Err` means the pipeline could not be reached at all;
/// callers treat it the same as a reported failure.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn dispatch(
        &self,
        request: &DispatchRequest,
        secrets: &Secrets,
        cancel: &CancellationToken,
    ) -> Result<PipelineStatus>;
}
