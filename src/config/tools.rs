// ABOUTME: Settings for the command-line tools behind the stage clients.
// ABOUTME: Binary names, per-call timeouts and cluster targeting for git, docker and kubectl.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolsConfig {
    /// Directory that fetched source trees are checked out under.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub kubectl: KubectlConfig,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            work_dir: default_work_dir(),
            git: GitConfig::default(),
            docker: DockerConfig::default(),
            kubectl: KubectlConfig::default(),
        }
    }
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".slipway/work")
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_git")]
    pub binary: String,

    #[serde(default = "default_fetch_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            binary: default_git(),
            timeout: default_fetch_timeout(),
        }
    }
}

fn default_git() -> String {
    "git".to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(5 * 60)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DockerConfig {
    #[serde(default = "default_docker")]
    pub binary: String,

    /// Dockerfile path relative to the source root.
    #[serde(default)]
    pub dockerfile: Option<PathBuf>,

    #[serde(default = "default_build_timeout", with = "humantime_serde")]
    pub build_timeout: Duration,

    #[serde(default = "default_push_timeout", with = "humantime_serde")]
    pub push_timeout: Duration,
}

impl Default for DockerConfig {
    fn default() -> Self {
        DockerConfig {
            binary: default_docker(),
            dockerfile: None,
            build_timeout: default_build_timeout(),
            push_timeout: default_push_timeout(),
        }
    }
}

fn default_docker() -> String {
    "docker".to_string()
}

fn default_build_timeout() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_push_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KubectlConfig {
    #[serde(default = "default_kubectl")]
    pub binary: String,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default = "default_deploy_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        KubectlConfig {
            binary: default_kubectl(),
            namespace: None,
            context: None,
            timeout: default_deploy_timeout(),
        }
    }
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

fn default_deploy_timeout() -> Duration {
    Duration::from_secs(2 * 60)
}
