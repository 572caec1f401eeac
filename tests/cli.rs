// ABOUTME: Integration tests for the slipway CLI commands.
// ABOUTME: Validates --help output, init, validate and plan behavior.

use assert_cmd::Command;
use predicates::prelude::*;
use slipway::config::Config;
use std::fs;

fn slipway_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("slipway"))
}

const CONFIG: &str = r#"
source_location: https://example.com/app.git@main
image_name: svc:1
cluster_endpoint: https://k8s.example.com
deployments:
  - name: a
    replicas: 3
    container_port: 8080
  - name: b
    replicas: 1
    container_port: 9090
"#;

#[test]
fn help_shows_commands() {
    slipway_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("run"));
}

mod init {
    use super::*;

    #[test]
    fn init_creates_config_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("slipway.yml");

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created slipway.yml"));

        assert!(config_path.exists(), "slipway.yml should be created");
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("image_name:"));
        assert!(content.contains("deployments:"));
    }

    #[test]
    fn init_uses_given_source_and_image() {
        let temp_dir = tempfile::tempdir().unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .args(["init", "--source", "https://git.example.com/x.git@v3"])
            .args(["--image", "ghcr.io/org/x:3"])
            .assert()
            .success();

        let content = fs::read_to_string(temp_dir.path().join("slipway.yml")).unwrap();
        let config = Config::from_yaml(&content).unwrap();
        assert_eq!(
            config.pipeline.source_location,
            "https://git.example.com/x.git@v3"
        );
        assert_eq!(config.pipeline.image_name, "ghcr.io/org/x:3");
    }

    #[test]
    fn init_keeps_awkward_source_intact() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = "https://git.example.com/x.git #mirror@v3";

        slipway_cmd()
            .current_dir(temp_dir.path())
            .args(["init", "--source", source])
            .assert()
            .success();

        let content = fs::read_to_string(temp_dir.path().join("slipway.yml")).unwrap();
        let config = Config::from_yaml(&content).unwrap();
        assert_eq!(config.pipeline.source_location, source);
    }

    #[test]
    fn init_refuses_to_overwrite_existing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("slipway.yml");

        fs::write(&config_path, "existing: config").unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("init")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("already exists"));

        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, "existing: config");
    }

    #[test]
    fn init_force_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("slipway.yml");
        fs::write(&config_path, "existing: config").unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("source_location:"));
    }
}

mod validate {
    use super::*;

    #[test]
    fn valid_config_reports_deployment_count() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("slipway.yml"), CONFIG).unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("validate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration valid: 2 deployment(s)"));
    }

    #[test]
    fn invalid_config_reports_first_violation() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("slipway.yml"),
            CONFIG.replace("replicas: 3", "replicas: -3"),
        )
        .unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("validate")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("replica count must be >= 0"));
    }

    #[test]
    fn missing_config_fails() {
        let temp_dir = tempfile::tempdir().unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("validate")
            .assert()
            .failure()
            .stderr(predicate::str::contains("configuration file not found"));
    }

    #[test]
    fn explicit_config_path_is_used() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("custom.yml");
        fs::write(&path, CONFIG).unwrap();

        slipway_cmd()
            .arg("validate")
            .arg("--config")
            .arg(&path)
            .assert()
            .success();
    }

    #[test]
    fn json_errors_are_structured() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("slipway.yml"),
            CONFIG.replace("image_name: svc:1", "image_name: \"svc:\""),
        )
        .unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .args(["validate", "--json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains(r#""event":"error""#));
    }
}

mod plan {
    use super::*;

    #[test]
    fn plan_lists_stage_calls_in_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("slipway.yml"), CONFIG).unwrap();

        let output = slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("plan")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let stdout = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("1. fetch"));
        assert!(lines[0].ends_with("https://example.com/app.git@main"));
        assert!(lines[1].starts_with("2. build"));
        assert!(lines[2].starts_with("3. push"));
        assert!(lines[3].contains("deploy  a (replicas=3, port=8080)"));
        assert!(lines[4].contains("deploy  b (replicas=1, port=9090)"));
    }

    #[test]
    fn plan_json_is_one_object() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("slipway.yml"), CONFIG).unwrap();

        let output = slipway_cmd()
            .current_dir(temp_dir.path())
            .args(["plan", "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["event"], "plan");
        assert_eq!(value["steps"].as_array().unwrap().len(), 5);
    }
}

mod run {
    use super::*;

    #[test]
    fn invalid_config_fails_before_any_tool_runs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = format!(
            "{}tools:\n  git:\n    binary: /nonexistent/git\n",
            CONFIG.replace("container_port: 9090", "container_port: 0")
        );
        fs::write(temp_dir.path().join("slipway.yml"), config).unwrap();

        slipway_cmd()
            .current_dir(temp_dir.path())
            .arg("run")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("container port must be within 1-65535"));
    }
}
