// ABOUTME: Test support utilities.
// ABOUTME: Recording stage-client doubles with scriptable failures, shared by integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use slipway::client::{
    BuildContext, BuildError, ClusterDeployer, DeployError, FetchError, ImageBuilder,
    PublishError, SourceFetcher, SourceTree,
};
use slipway::config::{DeploymentSpec, DeploymentTarget, PipelineConfig, SourceLocation};
use slipway::types::{CommitId, ImageId, ImageRef};
use std::collections::HashMap;
use std::sync::{Arc, Once};
use tokio::sync::Notify;

pub const FAKE_COMMIT: &str = "4f2a9c1d8e7b6a5f4e3d2c1b0a9f8e7d6c5b4a39";
pub const FAKE_IMAGE_ID: &str = "sha256:9b2e61f0c4a1d3e5f7a9b1c3d5e7f9a1b3c5d7e9";

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("slipway=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// One stage call as a double observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch {
        source: String,
    },
    Build {
        root: String,
        image: String,
    },
    Push {
        image: String,
    },
    Deploy {
        name: String,
        replicas: u32,
        port: u16,
        image: String,
    },
}

impl Call {
    /// Short form used in sequence assertions: `fetch`, `build`, `push`, `deploy(a)`.
    pub fn label(&self) -> String {
        match self {
            Call::Fetch { .. } => "fetch".to_string(),
            Call::Build { .. } => "build".to_string(),
            Call::Push { .. } => "push".to_string(),
            Call::Deploy { name, .. } => format!("deploy({})", name),
        }
    }
}

/// Call log shared by every double of one test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.0.lock().iter().map(Call::label).collect()
    }

    pub fn deploys(&self) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Deploy { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, label: &str) -> usize {
        self.labels().iter().filter(|l| *l == label).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

#[derive(Debug, Default)]
pub struct FakeFetcher {
    log: CallLog,
    failure: Mutex<Option<FetchError>>,
}

impl FakeFetcher {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            failure: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, err: FetchError) {
        *self.failure.lock() = Some(err);
    }
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, source: &SourceLocation) -> Result<SourceTree, FetchError> {
        self.log.record(Call::Fetch {
            source: source.to_string(),
        });
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        Ok(SourceTree::new("/tmp/slipway-fake/src").with_commit(CommitId::new(FAKE_COMMIT)))
    }
}

#[derive(Debug, Default)]
pub struct FakeBuilder {
    log: CallLog,
    build_failure: Mutex<Option<BuildError>>,
    push_failure: Mutex<Option<PublishError>>,
    build_blocked: Mutex<bool>,
    build_started: Arc<Notify>,
}

impl FakeBuilder {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub fn fail_build_with(&self, err: BuildError) {
        *self.build_failure.lock() = Some(err);
    }

    pub fn fail_push_with(&self, err: PublishError) {
        *self.push_failure.lock() = Some(err);
    }

    /// Make builds hang until their future is dropped.
    pub fn block_build(&self) {
        *self.build_blocked.lock() = true;
    }

    /// Signalled when a blocked build has been entered.
    pub fn build_started(&self) -> Arc<Notify> {
        Arc::clone(&self.build_started)
    }
}

#[async_trait]
impl ImageBuilder for FakeBuilder {
    async fn build(&self, tree: &SourceTree, image: &ImageRef) -> Result<BuildContext, BuildError> {
        self.log.record(Call::Build {
            root: tree.root().display().to_string(),
            image: image.to_string(),
        });
        let blocked = *self.build_blocked.lock();
        if blocked {
            self.build_started.notify_one();
            std::future::pending::<()>().await;
        }
        if let Some(err) = self.build_failure.lock().clone() {
            return Err(err);
        }
        Ok(BuildContext::new(image.clone()).with_image_id(ImageId::new(FAKE_IMAGE_ID)))
    }

    async fn push(&self, _context: &BuildContext, image: &ImageRef) -> Result<(), PublishError> {
        self.log.record(Call::Push {
            image: image.to_string(),
        });
        match self.push_failure.lock().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeDeployer {
    log: CallLog,
    failures: Mutex<HashMap<String, DeployError>>,
    blocked: Mutex<Option<String>>,
    started: Arc<Notify>,
}

impl FakeDeployer {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub fn fail_on(&self, name: &str, err: DeployError) {
        self.failures.lock().insert(name.to_string(), err);
    }

    pub fn heal(&self, name: &str) {
        self.failures.lock().remove(name);
    }

    /// Make the deploy of `name` hang until its future is dropped.
    pub fn block_on(&self, name: &str) {
        *self.blocked.lock() = Some(name.to_string());
    }

    /// Signalled when a blocked deploy has been entered.
    pub fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }
}

#[async_trait]
impl ClusterDeployer for FakeDeployer {
    async fn deploy(&self, target: &DeploymentTarget, image: &ImageRef) -> Result<(), DeployError> {
        let name = target.name.to_string();
        self.log.record(Call::Deploy {
            name: name.clone(),
            replicas: target.replicas,
            port: target.container_port,
            image: image.to_string(),
        });

        let blocked = self.blocked.lock().as_deref() == Some(name.as_str());
        if blocked {
            self.started.notify_one();
            std::future::pending::<()>().await;
        }

        match self.failures.lock().get(&name).cloned() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// The three doubles wired to one log.
pub struct Fakes {
    pub log: CallLog,
    pub fetcher: FakeFetcher,
    pub builder: FakeBuilder,
    pub deployer: FakeDeployer,
}

impl Fakes {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            fetcher: FakeFetcher::new(&log),
            builder: FakeBuilder::new(&log),
            deployer: FakeDeployer::new(&log),
            log,
        }
    }
}

/// `repo@main` built as `svc:1`, deploying a(3, 8080) then b(1, 9090).
pub fn two_deployment_config() -> PipelineConfig {
    config_with(vec![
        DeploymentSpec::new("a", 3, 8080),
        DeploymentSpec::new("b", 1, 9090),
    ])
}

pub fn config_with(deployments: Vec<DeploymentSpec>) -> PipelineConfig {
    PipelineConfig {
        source_location: "repo@main".to_string(),
        revision: None,
        image_name: "svc:1".to_string(),
        cluster_endpoint: "https://cluster.test".to_string(),
        deployments,
    }
}

/// `count` deployments named d0, d1, ...
pub fn numbered_config(count: usize) -> PipelineConfig {
    config_with(
        (0..count)
            .map(|i| DeploymentSpec::new(format!("d{}", i), 1, 8000 + i as i32))
            .collect(),
    )
}
