//! Command-line interface for the Montara CI client.
//!
//! Every option doubles as a GitHub-Action input through the `INPUT_*`
//! environment convention, so the binary runs unchanged inside a workflow
//! step or from a shell.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::adapters::{CiEvent, EventSink, GithubPublisher, PullRequestContext, SegmentSink};
use crate::config::{RawInputs, RunConfig};
use crate::core::{MontaraClient, Orchestrator, PollPolicy, TriggerRequest};
use crate::domain::RunOutcome;
use crate::error::RunError;

/// Trigger a Montara pipeline run and report its result to the pull request.
#[derive(Parser, Debug)]
#[command(name = "montara-ci")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Montara webhook URL that triggers the pipeline run
    #[arg(long, env = "INPUT_WEBHOOKURL")]
    webhook_url: Option<String>,

    /// Schema to fall back to when the branch has no dedicated schema
    #[arg(long, env = "INPUT_FALLBACKSCHEMA")]
    fallback_schema: Option<String>,

    /// Target the staging Montara environment ("true"/"false")
    #[arg(long, env = "INPUT_ISSTAGING")]
    is_staging: Option<String>,

    /// Run only models affected by the change ("true"/"false", default true)
    #[arg(long, env = "INPUT_ISSMARTRUN")]
    is_smart_run: Option<String>,

    /// Allow this run to start while another is active (default true)
    #[arg(long, env = "INPUT_ALLOWCONCURRENTPIPELINERUNS")]
    allow_concurrent_pipeline_runs: Option<String>,

    /// Force a full refresh of incremental models ("true"/"false")
    #[arg(long, env = "INPUT_FULLREFRESH")]
    full_refresh: Option<String>,

    /// Maximum number of status checks before giving up (default 60)
    #[arg(long, env = "INPUT_NUMRETRIES")]
    num_retries: Option<String>,

    /// dbt variables as a flat JSON object of strings
    #[arg(long, env = "INPUT_VARIABLES")]
    variables: Option<String>,
}

impl Cli {
    /// Run the CI job. Returns an error (and a non-zero process exit) for
    /// every outcome except a completed run or a benign cancellation.
    pub async fn execute(self) -> Result<()> {
        let sink: Arc<dyn EventSink> = Arc::new(SegmentSink::new());
        sink.track(CiEvent::JobStarted, HashMap::new()).await;

        match self.run(Arc::clone(&sink)).await {
            Ok(RunOutcome::Completed) => {
                info!("Pipeline run completed successfully");
                Ok(())
            }
            Ok(RunOutcome::SkippedNoModels) => {
                info!("Pipeline run was cancelled with nothing to do; treating as success");
                Ok(())
            }
            Err(err) => {
                if matches!(
                    err,
                    RunError::Configuration(_)
                        | RunError::Trigger(_)
                        | RunError::StatusCheck(_)
                        | RunError::Runtime(_)
                ) {
                    sink.track(
                        CiEvent::JobRuntimeError,
                        HashMap::from([("error".to_string(), err.to_string())]),
                    )
                    .await;
                }
                error!("{}", err);
                Err(err.into())
            }
        }
    }

    async fn run(&self, sink: Arc<dyn EventSink>) -> Result<RunOutcome, RunError> {
        let config = RunConfig::resolve(self.raw_inputs())?;
        let context = PullRequestContext::from_env()?;

        info!(
            webhook_url = %config.webhook_url,
            fallback_schema = %config.fallback_schema,
            num_retries = config.num_retries,
            "Montara CI is running"
        );
        info!(
            branch = %context.branch,
            commit = %context.commit,
            pr = context.pr_number,
            "Resolved pull request context"
        );

        let publisher = GithubPublisher::from_env(context.clone())?;
        let client = MontaraClient::new(config.webhook_url.clone(), config.is_staging);
        let policy = PollPolicy::default().with_num_retries(config.num_retries);

        let orchestrator = Orchestrator::new(
            Box::new(client),
            Box::new(publisher),
            sink,
            policy,
            config.is_staging,
        );

        let request = TriggerRequest {
            branch: context.branch,
            commit: context.commit,
            run_environment: "CI".to_string(),
            fallback_schema: config.fallback_schema,
            is_smart_run: config.is_smart_run,
            full_refresh: config.full_refresh,
            allow_concurrent_pipeline_runs: config.allow_concurrent_pipeline_runs,
            dbt_variables: config.variables,
        };

        orchestrator.run(&request).await
    }

    fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            webhook_url: self.webhook_url.clone(),
            fallback_schema: self.fallback_schema.clone(),
            is_staging: self.is_staging.clone(),
            is_smart_run: self.is_smart_run.clone(),
            allow_concurrent_pipeline_runs: self.allow_concurrent_pipeline_runs.clone(),
            full_refresh: self.full_refresh.clone(),
            num_retries: self.num_retries.clone(),
            variables: self.variables.clone(),
        }
    }
}
