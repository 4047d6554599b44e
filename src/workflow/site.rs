use std::fmt;

use serde::{Deserialize, Serialize};

/// Label a pull request must carry for either gate to open.
pub const RUN_BENCHMARKS_LABEL: &str = "ci:run-benchmarks";

/// Label that opts a pull request out of the lightened test run.
pub const FULL_TEST_SUITE_LABEL: &str = "ci:run-full-test-suite";

/// Branch benchmarked as the baseline when the caller supplies none.
pub const DEFAULT_REF_BRANCH: &str = "add-pytest-benchmarks";

/// Test jobs the reusable pipeline skips on every dispatch.
pub const SKIP_CI_TEST_JOBS: [&str; 10] = [
    "torch-tests",
    "autograd-tests",
    "tf-tests",
    "core-tests",
    "all-interfaces-tests",
    "external-libraries-tests",
    "qcut-tests",
    "qchem-tests",
    "gradients-tests",
    "data-tests",
];

/// The two dispatch sites, named after the pipeline mode each one requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    ReferenceBenchmarks,
    Benchmarks,
}

impl PipelineMode {
    /// Sites in the order an invocation runs them.
    pub const ALL: [PipelineMode; 2] = [PipelineMode::ReferenceBenchmarks, PipelineMode::Benchmarks];

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineMode::ReferenceBenchmarks => "reference-benchmarks",
            PipelineMode::Benchmarks => "benchmarks",
        }
    }

    /// Site this one must wait for, if any.
    pub fn needs(self) -> Option<PipelineMode> {
        match self {
            PipelineMode::ReferenceBenchmarks => None,
            PipelineMode::Benchmarks => Some(PipelineMode::ReferenceBenchmarks),
        }
    }

    pub fn required_label(self) -> &'static str {
        RUN_BENCHMARKS_LABEL
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Skip list in the comma-separated form the reusable pipeline reads.
pub fn skip_ci_test_jobs() -> String {
    SKIP_CI_TEST_JOBS.join(", ")
}
