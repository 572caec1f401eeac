// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, and renders pipeline events.

use serde::Serialize;
use std::time::Instant;

use crate::pipeline::{EventSink, PipelineEvent, RunState, RunSummary};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

impl OutputMode {
    pub fn from_flags(quiet: bool, json: bool) -> Self {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

/// Handles CLI output based on the configured mode.
#[derive(Debug)]
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                // Print only the essential result
                println!("{message}");
            }
            OutputMode::Json => {
                let event = JsonMessage {
                    event: "success",
                    message,
                    duration_secs: self.duration_secs(),
                };
                print_json(&event);
            }
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = JsonMessage {
                    event: "warning",
                    message,
                    duration_secs: None,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => {
                let event = JsonMessage {
                    event: "error",
                    message,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print the terminal result of a run. Only JSON mode prints successes
    /// here; the other modes report them through `success`.
    pub fn summary(&self, summary: &RunSummary) {
        if self.mode == OutputMode::Json {
            print_json(&JsonSummary {
                event: "summary",
                summary,
                duration_secs: self.duration_secs(),
            });
        }
    }
}

impl EventSink for Output {
    fn emit(&self, event: &PipelineEvent) {
        match self.mode {
            OutputMode::Normal => {
                if let Some(line) = describe_event(event) {
                    println!("{line}");
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => print_json(event),
        }
    }
}

/// One-line human description of an event, or `None` for events that
/// have nothing worth showing.
pub fn describe_event(event: &PipelineEvent) -> Option<String> {
    match event {
        PipelineEvent::StateChanged { to, .. } => match to {
            RunState::Fetching => Some("  → Fetching source...".to_string()),
            RunState::Building => Some("  → Building image...".to_string()),
            RunState::Publishing => Some("  → Pushing image...".to_string()),
            RunState::Deploying { index } => Some(format!("  → Applying deployment #{}...", index)),
            RunState::Pending | RunState::Succeeded | RunState::Failed => None,
        },
        PipelineEvent::SourceFetched { source, commit } => Some(match commit {
            Some(commit) => format!("  ✓ Fetched {} at {}", source, commit.short()),
            None => format!("  ✓ Fetched {}", source),
        }),
        PipelineEvent::ImageBuilt { image, image_id } => Some(match image_id {
            Some(id) => format!("  ✓ Built {} ({})", image, id.short()),
            None => format!("  ✓ Built {}", image),
        }),
        PipelineEvent::ImagePushed { image } => Some(format!("  ✓ Pushed {}", image)),
        PipelineEvent::DeploymentApplied { index, name } => {
            Some(format!("  ✓ Applied deployment #{} ({})", index, name))
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    event: &'a str,
    #[serde(flatten)]
    summary: &'a RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
