use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::auth::{Secrets, Token};
use crate::config::Config;
use crate::context::InvocationContext;
use crate::orchestrator::Orchestrator;
use crate::output::{self, InvocationProgress};
use crate::pipeline::CommandPipeline;
use crate::providers::{EventInputs, GitHubEventSource};
use crate::replay;
use crate::workflow;

#[derive(Parser)]
#[command(name = "benchgate")]
#[command(author, version, about = "Benchmark CI dispatcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./benchgate.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dispatch requests a trigger would produce, without running them
    Plan {
        #[command(flatten)]
        trigger: TriggerArgs,
    },
    /// Run the invocation through the configured pipeline
    Run {
        #[command(flatten)]
        trigger: TriggerArgs,

        #[arg(long, env = "CODECOV_TOKEN", hide_env_values = true)]
        codecov_token: Option<String>,
    },
    /// Feed a file of recorded triggers through one shared orchestrator
    Replay {
        file: PathBuf,

        #[arg(long, env = "CODECOV_TOKEN", hide_env_values = true)]
        codecov_token: Option<String>,
    },
}

#[derive(Args)]
struct TriggerArgs {
    #[arg(short, long, env = "GITHUB_EVENT_NAME")]
    event: String,

    /// Ref that triggered the invocation
    #[arg(short, long = "ref", env = "GITHUB_REF")]
    ref_id: String,

    /// Pull request label (repeatable)
    #[arg(short, long = "label")]
    labels: Vec<String>,

    /// Baseline branch for reference-benchmarks
    #[arg(long)]
    ref_branch: Option<String>,

    /// Branch for benchmarks (defaults to the triggering ref)
    #[arg(short, long)]
    branch: Option<String>,

    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Pull request number, used to fetch labels from the API
    #[arg(long)]
    pr: Option<u64>,

    /// Repository in owner/repo form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: Option<String>,

    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl TriggerArgs {
    async fn context(&self, config: &Config) -> Result<InvocationContext> {
        let source = GitHubEventSource::new(
            config.github.base_url.clone(),
            self.token.as_deref().map(Token::from),
        );

        let inputs = EventInputs {
            event: self.event.clone(),
            ref_id: self.ref_id.clone(),
            labels: self.labels.clone(),
            ref_branch: self.ref_branch.clone(),
            branch: self.branch.clone(),
            event_path: self.event_path.clone(),
            pr_number: self.pr,
            repo: self.repo.clone().or_else(|| config.github.repo.clone()),
        };

        source
            .context(inputs)
            .await
            .context("Failed to resolve the trigger context")
    }
}

impl Cli {
    fn pretty(&self, config: &Config) -> bool {
        self.pretty || config.output.pretty
    }

    fn orchestrator(config: &Config, codecov_token: Option<&str>) -> Result<Orchestrator> {
        let pipeline = CommandPipeline::new(
            config.pipeline.command.clone(),
            config.pipeline.timeout_secs,
            config.pipeline.working_dir.clone(),
        )
        .context("No pipeline command configured; set [pipeline] command in benchgate.toml")?;

        Ok(Orchestrator::new(
            Arc::new(pipeline),
            Secrets::new(codecov_token.map(Token::from)),
        ))
    }

    async fn execute_plan(&self, config: &Config, trigger: &TriggerArgs) -> Result<()> {
        let context = trigger.context(config).await?;
        let requests = workflow::plan(&context);

        info!(
            "{} of {} dispatch sites open for {} on {}",
            requests.len(),
            workflow::PipelineMode::ALL.len(),
            context.event,
            context.ref_id
        );

        output::write_json(&requests, self.pretty(config), self.output.as_deref())
    }

    async fn execute_run(
        &self,
        config: &Config,
        trigger: &TriggerArgs,
        codecov_token: Option<&str>,
    ) -> Result<()> {
        let orchestrator = Self::orchestrator(config, codecov_token)?;
        let context = trigger.context(config).await?;

        let progress = InvocationProgress::start(&context.ref_id);
        let report = orchestrator.invoke(context).await;
        progress.finish(&report);

        output::print_summary(&report);
        output::write_json(&report, self.pretty(config), self.output.as_deref())?;

        if report.has_failures() {
            anyhow::bail!("Invocation #{} had failed dispatches", report.invocation_id);
        }

        Ok(())
    }

    async fn execute_replay(
        &self,
        config: &Config,
        file: &std::path::Path,
        codecov_token: Option<&str>,
    ) -> Result<()> {
        let orchestrator = Self::orchestrator(config, codecov_token)?;
        let entries = replay::load_entries(file)?;
        let reports = replay::run(&orchestrator, entries).await?;

        for report in &reports {
            output::print_summary(report);
        }

        output::write_json(&reports, self.pretty(config), self.output.as_deref())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Plan { trigger } => self.execute_plan(&config, trigger).await,
            Commands::Run {
                trigger,
                codecov_token,
            } => {
                self.execute_run(&config, trigger, codecov_token.as_deref())
                    .await
            }
            Commands::Replay {
                file,
                codecov_token,
            } => {
                self.execute_replay(&config, file, codecov_token.as_deref())
                    .await
            }
        }
    }
}
