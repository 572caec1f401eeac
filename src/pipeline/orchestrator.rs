// ABOUTME: Drives a full run: validate, fetch, build, push, then every deployment in order.
// ABOUTME: Generic over the three collaborators so tests can substitute recording doubles.

use std::sync::Arc;
use tracing::Instrument;

use super::cancel::Cancellation;
use super::error::PipelineError;
use super::events::EventSink;
use super::report::RunReport;
use super::run::PipelineRun;
use crate::client::{ClusterDeployer, ImageBuilder, SourceFetcher};
use crate::config::PipelineConfig;

/// Owns a pipeline configuration and the clients it runs against.
///
/// Each call to [`Orchestrator::run`] is an independent run: nothing carries
/// over between runs, and every deployment is applied again.
pub struct Orchestrator<F, B, D> {
    config: PipelineConfig,
    fetcher: F,
    builder: B,
    deployer: D,
    events: Arc<dyn EventSink>,
    cancel: Cancellation,
}

impl<F, B, D> Orchestrator<F, B, D>
where
    F: SourceFetcher,
    B: ImageBuilder,
    D: ClusterDeployer,
{
    pub fn new(config: PipelineConfig, fetcher: F, builder: B, deployer: D) -> Self {
        Self {
            config,
            fetcher,
            builder,
            deployer,
            events: Arc::new(()),
            cancel: Cancellation::never(),
        }
    }

    pub fn with_events(mut self, sink: impl EventSink + 'static) -> Self {
        self.events = Arc::new(sink);
        self
    }

    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// Execute one run to completion.
    ///
    /// Stage calls happen strictly in sequence; the first failure stops the
    /// run and no later stage is attempted. Configuration problems are
    /// reported before any collaborator is contacted.
    ///
    /// # Errors
    ///
    /// Returns the first failure, tagged with its stage (and, for deploy
    /// failures, the deployment's index and name).
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let span = tracing::info_span!(
            "pipeline",
            image = %self.config.image_name,
            deployments = self.config.deployments.len()
        );

        async {
            let sink: &dyn EventSink = &*self.events;
            let run = PipelineRun::start(&self.config, sink, &self.cancel)?;
            let report = run
                .fetch(&self.fetcher)
                .await?
                .build(&self.builder)
                .await?
                .push(&self.builder)
                .await?
                .deploy_all(&self.deployer)
                .await?
                .finish();

            tracing::info!(
                deployed = report.deployed.len(),
                elapsed_ms = report.duration().num_milliseconds(),
                "pipeline run succeeded"
            );
            Ok::<_, PipelineError>(report)
        }
        .instrument(span)
        .await
    }
}

impl<F, B, D> std::fmt::Debug for Orchestrator<F, B, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
