//! Gating and parameter rules for the two benchmark dispatch sites.

mod gate;
mod outcome;
mod params;
mod request;
mod site;

pub use outcome::{InvocationReport, JobOutcome, JobStatus, SkipReason};
pub use request::{plan, resolve, DispatchRequest};
pub use site::PipelineMode;

#[cfg(test)]
pub use site::{skip_ci_test_jobs, FULL_TEST_SUITE_LABEL, RUN_BENCHMARKS_LABEL};
