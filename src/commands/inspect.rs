// ABOUTME: Validate and plan command implementations.
// ABOUTME: Both check the configuration offline; plan also lists the stage calls in order.

use serde_json::json;
use slipway::config::{Config, RunPlan};
use slipway::error::Result;
use slipway::output::{Output, OutputMode};

/// Validate the configuration and report how many deployments it names.
pub fn validate(config: &Config, output: &Output) -> Result<()> {
    let plan = config.pipeline.plan()?;
    output.success(&format!(
        "Configuration valid: {} deployment(s)",
        plan.deployments.len()
    ));
    Ok(())
}

/// Print the ordered stage calls a run of this configuration would make.
pub fn plan(config: &Config, output: &Output) -> Result<()> {
    let plan = config.pipeline.plan()?;
    let steps = plan_steps(&plan);

    match output.mode() {
        OutputMode::Json => {
            let value = json!({
                "event": "plan",
                "steps": steps,
            });
            println!("{}", value);
        }
        OutputMode::Normal | OutputMode::Quiet => {
            for (n, step) in steps.iter().enumerate() {
                println!("{}. {}", n + 1, step);
            }
        }
    }
    Ok(())
}

fn plan_steps(plan: &RunPlan) -> Vec<String> {
    let mut steps = vec![
        format!("fetch   {}", plan.source),
        format!("build   {}", plan.image),
        format!("push    {}", plan.image),
    ];
    let endpoint = plan.cluster_endpoint.as_deref().unwrap_or_default();
    for target in &plan.deployments {
        steps.push(format!(
            "deploy  {} (replicas={}, port={}) -> {}",
            target.name, target.replicas, target.container_port, endpoint
        ));
    }
    steps
}
