use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, Command};
use tokio_util::sync::CancellationToken;

use crate::auth::Secrets;
use crate::error::{BenchGateError, Result};
use crate::workflow::DispatchRequest;

use super::{Pipeline, PipelineStatus};

const STDERR_TAIL_LINES: usize = 20;

/// How long stderr may keep draining once the pipeline process has exited.
/// Background processes that inherited the pipe would otherwise hold it open.
const STDERR_DRAIN_GRACE: Duration = Duration::from_millis(500);

type StderrTail = Arc<Mutex<VecDeque<String>>>;

/// Runs the reusable pipeline as a local command.
///
/// The request is exported through `BENCH_*` environment variables and the
/// coverage token, when present, through `CODECOV_TOKEN`.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    command: Vec<String>,
    timeout_secs: u64,
    working_dir: Option<PathBuf>,
}

impl CommandPipeline {
    /// # Errors
    ///
    /// Returns an error if `command` is empty.
    pub fn new(command: Vec<String>, timeout_secs: u64, working_dir: Option<PathBuf>) -> Result<Self> {
        if command.is_empty() {
            return Err(BenchGateError::Config(
                "pipeline command must not be empty".to_string(),
            ));
        }

        Ok(Self {
            command,
            timeout_secs,
            working_dir,
        })
    }

    fn build_command(&self, request: &DispatchRequest, secrets: &Secrets) -> Command {
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .env("BENCH_BRANCH", &request.branch)
            .env("BENCH_PIPELINE_MODE", request.pipeline_mode.as_str())
            .env("BENCH_RUN_LIGHTENED_CI", request.run_lightened_ci.to_string())
            .env("BENCH_SKIP_CI_TEST_JOBS", &request.skip_ci_test_jobs)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(token) = &secrets.codecov_token {
            cmd.env("CODECOV_TOKEN", token.as_str());
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}

#[async_trait]
impl Pipeline for CommandPipeline {
    async fn dispatch(
        &self,
        request: &DispatchRequest,
        secrets: &Secrets,
        cancel: &CancellationToken,
    ) -> Result<PipelineStatus> {
        info!(
            "Dispatching {} for branch {} (lightened: {})",
            request.pipeline_mode, request.branch, request.run_lightened_ci
        );

        let mut child = self
            .build_command(request, secrets)
            .spawn()
            .map_err(|e| BenchGateError::Spawn(format!("{}: {e}", self.command[0])))?;

        let tail = StderrTail::default();
        let mut stderr_reader = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(collect_stderr(stderr, Arc::clone(&tail))));

        let timeout = async {
            if self.timeout_secs > 0 {
                tokio::time::sleep(Duration::from_secs(self.timeout_secs)).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        let status = tokio::select! {
            status = child.wait() => status?,
            () = cancel.cancelled() => {
                warn!("{} cancelled, killing pipeline process", request.pipeline_mode);
                child.kill().await?;
                return Ok(PipelineStatus::Cancelled);
            }
            () = timeout => {
                child.kill().await?;
                return Ok(PipelineStatus::Failure {
                    message: format!("timed out after {} seconds", self.timeout_secs),
                });
            }
        };

        if let Some(reader) = stderr_reader.as_mut() {
            tokio::select! {
                _ = tokio::time::timeout(STDERR_DRAIN_GRACE, reader) => {}
                () = cancel.cancelled() => {
                    warn!("{} cancelled while draining stderr", request.pipeline_mode);
                    return Ok(PipelineStatus::Cancelled);
                }
            }
        }
        if let Some(reader) = stderr_reader {
            reader.abort();
        }

        debug!("{} exited with {status}", request.pipeline_mode);

        if status.success() {
            return Ok(PipelineStatus::Success);
        }

        let code = status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let tail = joined_tail(&tail);
        let message = if tail.is_empty() {
            format!("exited with code {code}")
        } else {
            format!("exited with code {code}: {tail}")
        };

        Ok(PipelineStatus::Failure { message })
    }
}

/// Keep the last `STDERR_TAIL_LINES` non-blank lines, decoding lossily.
async fn collect_stderr(stderr: ChildStderr, tail: StderrTail) {
    let mut reader = BufReader::new(stderr);
    let mut line = Vec::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                let text = text.trim_end();
                if text.trim().is_empty() {
                    continue;
                }
                let mut tail = tail.lock().unwrap_or_else(PoisonError::into_inner);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(text.to_string());
            }
            Err(e) => {
                debug!("Stopped reading pipeline stderr: {e}");
                break;
            }
        }
    }
}

fn joined_tail(tail: &StderrTail) -> String {
    let tail = tail.lock().unwrap_or_else(PoisonError::into_inner);
    tail.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
}
