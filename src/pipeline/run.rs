// ABOUTME: One pipeline execution as a type-state value: Pending -> Fetched -> Built -> Published -> Completed.
// ABOUTME: Each transition consumes the run, makes one stage call, and returns the next state or the first failure.

use chrono::{DateTime, Utc};
use snafu::ResultExt;
use std::future::Future;

use super::cancel::Cancellation;
use super::error::{
    BuildSnafu, CancelledSnafu, ConfigSnafu, DeploySnafu, FetchSnafu, PipelineError, PushSnafu,
    Stage,
};
use super::events::{EventSink, PipelineEvent};
use super::report::RunReport;
use super::state::{Built, Completed, Fetched, Pending, Published, RunState};
use crate::client::{BuildContext, ClusterDeployer, ImageBuilder, SourceFetcher, SourceTree};
use crate::config::{PipelineConfig, RunPlan};

/// A pipeline run in progress, parameterized by the stage it has reached.
///
/// Artifacts (the source tree, then the build context) live in the state
/// type and are dropped together with the run, whatever the outcome.
#[derive(Debug)]
pub struct PipelineRun<'a, S> {
    plan: RunPlan,
    tracker: Tracker<'a>,
    cancel: &'a Cancellation,
    started_at: DateTime<Utc>,
    state: S,
}

/// Current state plus the sink that hears about every change.
struct Tracker<'a> {
    state: RunState,
    sink: &'a dyn EventSink,
}

impl std::fmt::Debug for Tracker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("state", &self.state)
            .finish()
    }
}

impl<'a> Tracker<'a> {
    fn new(sink: &'a dyn EventSink) -> Self {
        Self {
            state: RunState::Pending,
            sink,
        }
    }

    fn enter(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        let from = std::mem::replace(&mut self.state, next);
        tracing::debug!(%from, to = %next, "run state changed");
        self.sink.emit(&PipelineEvent::StateChanged { from, to: next });
    }

    fn emit(&self, event: PipelineEvent) {
        self.sink.emit(&event);
    }

    fn fail(&mut self, error: PipelineError) -> PipelineError {
        tracing::warn!(state = %self.state, %error, "pipeline run failed");
        self.enter(RunState::Failed);
        error
    }

    /// Enter `next` and await `call`, unless cancellation wins.
    ///
    /// Returns `None` when cancelled, either before the call starts (the call
    /// future is then never polled) or while it is suspended.
    async fn call<T, E>(
        &mut self,
        cancel: &Cancellation,
        next: RunState,
        call: impl Future<Output = Result<T, E>>,
    ) -> Option<Result<T, E>> {
        if cancel.is_cancelled() {
            return None;
        }
        self.enter(next);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = call => Some(result),
        }
    }
}

impl<'a, S> PipelineRun<'a, S> {
    /// Move to the next type-state, turning the current artifacts into the next ones.
    fn advance<T>(self, next: impl FnOnce(S) -> T) -> PipelineRun<'a, T> {
        PipelineRun {
            plan: self.plan,
            tracker: self.tracker,
            cancel: self.cancel,
            started_at: self.started_at,
            state: next(self.state),
        }
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// The observable state of the run.
    pub fn run_state(&self) -> RunState {
        self.tracker.state
    }
}

impl<'a> PipelineRun<'a, Pending> {
    /// Validate `config` and start a run. Nothing external is contacted here.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Config` when validation fails; the run moves
    /// straight from pending to failed.
    pub fn start(
        config: &PipelineConfig,
        sink: &'a dyn EventSink,
        cancel: &'a Cancellation,
    ) -> Result<Self, PipelineError> {
        let mut tracker = Tracker::new(sink);
        let plan = config
            .plan()
            .context(ConfigSnafu)
            .map_err(|e| tracker.fail(e))?;

        Ok(PipelineRun {
            plan,
            tracker,
            cancel,
            started_at: Utc::now(),
            state: Pending,
        })
    }

    /// Fetch the source tree.
    ///
    /// # Errors
    ///
    /// `PipelineError::Fetch` on collaborator failure, `Cancelled` if stopped.
    pub async fn fetch<F: SourceFetcher + ?Sized>(
        mut self,
        fetcher: &F,
    ) -> Result<PipelineRun<'a, Fetched>, PipelineError> {
        tracing::info!(source = %self.plan.source, "fetching source");

        let outcome = self
            .tracker
            .call(self.cancel, RunState::Fetching, fetcher.fetch(&self.plan.source))
            .await;
        let tree = match outcome {
            Some(result) => result.context(FetchSnafu),
            None => cancelled(Stage::Fetch, None),
        }
        .map_err(|e| self.tracker.fail(e))?;

        self.tracker.emit(PipelineEvent::SourceFetched {
            source: self.plan.source.clone(),
            commit: tree.commit().cloned(),
        });
        Ok(self.advance(|Pending| Fetched { tree }))
    }
}

impl<'a> PipelineRun<'a, Fetched> {
    pub fn source_tree(&self) -> &SourceTree {
        &self.state.tree
    }

    /// Build the image from the fetched tree.
    ///
    /// # Errors
    ///
    /// `PipelineError::Build` on collaborator failure, `Cancelled` if stopped.
    pub async fn build<B: ImageBuilder + ?Sized>(
        mut self,
        builder: &B,
    ) -> Result<PipelineRun<'a, Built>, PipelineError> {
        tracing::info!(image = %self.plan.image, root = %self.state.tree.root().display(), "building image");

        let outcome = self
            .tracker
            .call(
                self.cancel,
                RunState::Building,
                builder.build(&self.state.tree, &self.plan.image),
            )
            .await;
        let context = match outcome {
            Some(result) => result.context(BuildSnafu),
            None => cancelled(Stage::Build, None),
        }
        .map_err(|e| self.tracker.fail(e))?;

        self.tracker.emit(PipelineEvent::ImageBuilt {
            image: self.plan.image.clone(),
            image_id: context.image_id().cloned(),
        });
        Ok(self.advance(|Fetched { tree }| Built { tree, context }))
    }
}

impl<'a> PipelineRun<'a, Built> {
    pub fn build_context(&self) -> &BuildContext {
        &self.state.context
    }

    /// Publish the built image.
    ///
    /// # Errors
    ///
    /// `PipelineError::Push` on collaborator failure, `Cancelled` if stopped.
    pub async fn push<B: ImageBuilder + ?Sized>(
        mut self,
        builder: &B,
    ) -> Result<PipelineRun<'a, Published>, PipelineError> {
        tracing::info!(image = %self.plan.image, "pushing image");

        let outcome = self
            .tracker
            .call(
                self.cancel,
                RunState::Publishing,
                builder.push(&self.state.context, &self.plan.image),
            )
            .await;
        match outcome {
            Some(result) => result.context(PushSnafu),
            None => cancelled(Stage::Push, None),
        }
        .map_err(|e| self.tracker.fail(e))?;

        self.tracker.emit(PipelineEvent::ImagePushed {
            image: self.plan.image.clone(),
        });
        Ok(self.advance(|Built { tree, context }| Published { tree, context }))
    }
}

impl<'a> PipelineRun<'a, Published> {
    /// Reconcile every deployment, one at a time, in configured order.
    ///
    /// Stops at the first failure. Deployments already applied stay applied.
    ///
    /// # Errors
    ///
    /// `PipelineError::Deploy` naming the failing deployment, or `Cancelled`
    /// with the index of the deployment that was about to run or in flight.
    pub async fn deploy_all<D: ClusterDeployer + ?Sized>(
        mut self,
        deployer: &D,
    ) -> Result<PipelineRun<'a, Completed>, PipelineError> {
        let mut deployed = Vec::with_capacity(self.plan.deployments.len());

        for (index, target) in self.plan.deployments.iter().enumerate() {
            tracing::info!(
                index,
                name = %target.name,
                replicas = target.replicas,
                port = target.container_port,
                "applying deployment"
            );

            let outcome = self
                .tracker
                .call(
                    self.cancel,
                    RunState::Deploying { index },
                    deployer.deploy(target, &self.plan.image),
                )
                .await;
            let applied = match outcome {
                Some(result) => result.context(DeploySnafu {
                    index,
                    name: target.name.clone(),
                }),
                None => cancelled(Stage::Deploy, Some(index)),
            };
            if let Err(e) = applied {
                return Err(self.tracker.fail(e));
            }

            self.tracker.emit(PipelineEvent::DeploymentApplied {
                index,
                name: target.name.clone(),
            });
            deployed.push(target.name.clone());
        }

        self.tracker.enter(RunState::Succeeded);
        Ok(self.advance(|Published { tree, context }| Completed {
            tree,
            context,
            deployed,
        }))
    }
}

impl PipelineRun<'_, Completed> {
    /// Release the run's artifacts and return what it produced.
    pub fn finish(self) -> RunReport {
        let Completed {
            tree,
            context,
            deployed,
        } = self.state;

        RunReport {
            source: self.plan.source,
            commit: tree.commit().cloned(),
            image: self.plan.image,
            image_id: context.image_id().cloned(),
            deployed,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

fn cancelled<T>(stage: Stage, deployment_index: Option<usize>) -> Result<T, PipelineError> {
    tracing::info!(%stage, "cancellation requested, issuing no further stage calls");
    CancelledSnafu {
        stage,
        deployment_index,
    }
    .fail()
}
