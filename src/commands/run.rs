// ABOUTME: Run command implementation.
// ABOUTME: Wires the command-line adapters into an orchestrator and cancels it on Ctrl-C.

use slipway::adapters;
use slipway::config::Config;
use slipway::error::Result;
use slipway::output::Output;
use slipway::pipeline::{Orchestrator, RunSummary, cancellation};
use std::sync::Arc;

/// Run the pipeline once against the configured tools.
pub async fn run(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    output.progress(&format!(
        "Running {} -> {} ({} deployment(s))",
        config.pipeline.source_location,
        config.pipeline.image_name,
        config.pipeline.deployments.len()
    ));

    let (fetcher, builder, deployer) = adapters::from_config(&config);
    let (handle, cancel) = cancellation();
    let output = Arc::new(output);

    let notices = Arc::clone(&output);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current call");
            notices.warning("Interrupted, stopping before the next stage call");
            handle.cancel();
        }
    });

    let orchestrator = Orchestrator::new(config.pipeline, fetcher, builder, deployer)
        .with_events(Arc::clone(&output))
        .with_cancellation(cancel);

    let result = orchestrator.run().await;
    interrupt.abort();

    output.summary(&RunSummary::from_result(&result));
    let report = result?;
    output.success(&format!(
        "Pipeline complete: {} deployment(s) applied",
        report.deployed.len()
    ));
    Ok(())
}
