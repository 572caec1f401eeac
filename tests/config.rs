// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, file discovery, tool settings and validation rules.

use proptest::prelude::*;
use slipway::config::*;
use slipway::error::Error;
use std::time::Duration;

fn valid() -> PipelineConfig {
    PipelineConfig {
        source_location: "https://example.com/app.git@main".to_string(),
        revision: None,
        image_name: "registry.example.com/app:1.4.2".to_string(),
        cluster_endpoint: "https://k8s.example.com".to_string(),
        deployments: vec![
            DeploymentSpec::new("api", 3, 8080),
            DeploymentSpec::new("worker", 1, 9090),
        ],
    }
}

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
source_location: repo@main
image_name: svc:1
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.pipeline.source_location, "repo@main");
        assert_eq!(config.pipeline.image_name, "svc:1");
        assert!(config.pipeline.deployments.is_empty());
        assert!(config.pipeline.cluster_endpoint.is_empty());
        assert_eq!(config.tools, ToolsConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
source_location: https://example.com/app.git
revision: release-1.4
image_name: registry.example.com/app:1.4.2
cluster_endpoint: https://k8s.example.com
deployments:
  - name: api
    replicas: 3
    container_port: 8080
  - name: worker
    replica_count: 0
    port: 9090
tools:
  work_dir: /var/tmp/slipway
  git:
    binary: /usr/bin/git
    timeout: 90s
  docker:
    dockerfile: docker/Dockerfile
    build_timeout: 1h
    push_timeout: 15m
  kubectl:
    namespace: prod
    context: prod-admin
    timeout: 45s
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let pipeline = &config.pipeline;
        assert_eq!(pipeline.revision.as_deref(), Some("release-1.4"));
        assert_eq!(pipeline.deployments.len(), 2);
        assert_eq!(pipeline.deployments[1], DeploymentSpec::new("worker", 0, 9090));

        let tools = &config.tools;
        assert_eq!(tools.work_dir.to_str(), Some("/var/tmp/slipway"));
        assert_eq!(tools.git.binary, "/usr/bin/git");
        assert_eq!(tools.git.timeout, Duration::from_secs(90));
        assert_eq!(tools.docker.binary, "docker");
        assert_eq!(tools.docker.build_timeout, Duration::from_secs(3600));
        assert_eq!(tools.docker.push_timeout, Duration::from_secs(15 * 60));
        assert_eq!(tools.kubectl.namespace.as_deref(), Some("prod"));
        assert_eq!(tools.kubectl.context.as_deref(), Some("prod-admin"));
        assert_eq!(tools.kubectl.timeout, Duration::from_secs(45));
    }

    #[test]
    fn negative_values_survive_parsing() {
        let yaml = r#"
source_location: repo
image_name: svc:1
cluster_endpoint: https://k8s
deployments:
  - name: a
    replicas: -1
    container_port: 70000
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.pipeline.deployments[0].replicas, -1);
        assert!(config.pipeline.validate().is_err());
    }

    #[test]
    fn missing_image_is_a_parse_error() {
        let err = Config::from_yaml("source_location: repo\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn template_is_valid() {
        let template = Config::template();
        assert!(template.pipeline.validate().is_ok());
    }
}

mod discovery {
    use super::*;
    use std::fs;

    const YAML: &str = "source_location: repo\nimage_name: svc:1\n";

    #[test]
    fn finds_primary_filename() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), YAML).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config.pipeline.image_name, "svc:1");
    }

    #[test]
    fn finds_config_in_dot_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".slipway")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), YAML).unwrap();
        assert!(Config::discover(dir.path()).is_ok());
    }

    #[test]
    fn missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::discover(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }

    #[test]
    fn explicit_path_wins_over_discovery() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), YAML).unwrap();
        let other = dir.path().join("other.yml");
        fs::write(&other, "source_location: repo\nimage_name: other:2\n").unwrap();

        let config = Config::resolve(Some(&other), dir.path()).unwrap();
        assert_eq!(config.pipeline.image_name, "other:2");
    }

    #[test]
    fn init_writes_a_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        init_config(
            dir.path(),
            Some("https://git.example.com/svc.git@v2"),
            Some("svc:2"),
            false,
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(
            config.pipeline.source_location,
            "https://git.example.com/svc.git@v2"
        );
        assert_eq!(config.pipeline.image_name, "svc:2");
        assert!(config.pipeline.validate().is_ok());
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), YAML).unwrap();

        let err = init_config(dir.path(), None, None, false).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(_)));

        init_config(dir.path(), None, None, true).unwrap();
        let config = Config::discover(dir.path()).unwrap();
        assert_eq!(config, Config::template());
    }

    #[test]
    fn init_rejects_invalid_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = init_config(dir.path(), None, Some("not an image!"), false).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfig(ConfigError::InvalidImageName { .. })
        ));
        assert!(!dir.path().join(CONFIG_FILENAME).exists());
    }
}

mod validation {
    use super::*;

    #[test]
    fn valid_config_passes_unchanged() {
        let config = valid();
        let before = config.clone();
        assert!(config.validate().is_ok());
        assert_eq!(config, before);
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut config = valid();
        config.source_location = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptySourceLocation));
    }

    #[test]
    fn bare_revision_suffix_is_rejected() {
        let mut config = valid();
        config.source_location = "repo@".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyRevision));
    }

    #[test]
    fn scp_style_url_is_not_a_revision() {
        let mut config = valid();
        config.source_location = "git@github.com:org/app.git".to_string();
        let plan = config.plan().unwrap();
        assert_eq!(plan.source.url(), "git@github.com:org/app.git");
        assert_eq!(plan.source.revision(), None);
    }

    #[test]
    fn empty_image_is_rejected() {
        let mut config = valid();
        config.image_name = String::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyImageName));
    }

    #[test]
    fn malformed_image_is_rejected() {
        let mut config = valid();
        config.image_name = "svc:".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidImageName { .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut config = valid();
        config.deployments.push(DeploymentSpec::new("api", 1, 8081));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateDeploymentName("api".to_string()))
        );
    }

    #[test]
    fn invalid_name_reports_index() {
        let mut config = valid();
        config.deployments[1].name = "two words".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDeploymentName { index: 1, .. })
        ));
    }

    #[test]
    fn negative_replicas_are_rejected() {
        let mut config = valid();
        config.deployments[0].replicas = -1;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeReplicas {
                name: "api".to_string(),
                replicas: -1
            })
        );
    }

    #[test]
    fn zero_replicas_are_allowed() {
        let mut config = valid();
        config.deployments[0].replicas = 0;
        assert_eq!(config.plan().unwrap().deployments[0].replicas, 0);
    }

    #[test]
    fn missing_endpoint_with_deployments_is_rejected() {
        let mut config = valid();
        config.cluster_endpoint = String::new();
        assert_eq!(config.validate(), Err(ConfigError::MissingClusterEndpoint));
    }

    #[test]
    fn first_violation_wins() {
        let mut config = valid();
        config.image_name = String::new();
        config.deployments[0].replicas = -5;
        assert_eq!(config.validate(), Err(ConfigError::EmptyImageName));
    }

    proptest! {
        #[test]
        fn ports_in_range_are_accepted(port in 1i32..=65535) {
            let mut config = valid();
            config.deployments[0].container_port = port;
            let plan = config.plan().unwrap();
            prop_assert_eq!(i32::from(plan.deployments[0].container_port), port);
        }

        #[test]
        fn ports_out_of_range_are_rejected(
            port in prop_oneof![i32::MIN..=0, 65536i32..=i32::MAX]
        ) {
            let mut config = valid();
            config.deployments[1].container_port = port;
            prop_assert_eq!(
                config.validate(),
                Err(ConfigError::PortOutOfRange { name: "worker".to_string(), port })
            );
        }

        #[test]
        fn replica_sign_decides_validity(replicas in any::<i32>()) {
            let mut config = valid();
            config.deployments[0].replicas = replicas;
            prop_assert_eq!(config.validate().is_ok(), replicas >= 0);
        }
    }
}
