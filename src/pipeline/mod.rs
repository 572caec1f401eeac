// ABOUTME: The build-and-deploy pipeline: state machine, events, cancellation and orchestration.
// ABOUTME: A run moves fetch -> build -> push -> deploy[0..n] and stops at the first failure.

mod cancel;
mod error;
mod events;
mod orchestrator;
mod report;
mod run;
mod state;

pub use cancel::{CancelHandle, Cancellation, cancellation};
pub use error::{PipelineError, Stage};
pub use events::{EventLog, EventSink, PipelineEvent};
pub use orchestrator::Orchestrator;
pub use report::{RunReport, RunStatus, RunSummary};
pub use run::PipelineRun;
pub use state::{Built, Completed, Fetched, Pending, Published, RunState};
