// ABOUTME: Structured progress events emitted by a pipeline run.
// ABOUTME: Callers pick the presentation by choosing an EventSink.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::state::RunState;
use crate::config::SourceLocation;
use crate::types::{CommitId, DeploymentName, ImageId, ImageRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StateChanged {
        from: RunState,
        to: RunState,
    },
    SourceFetched {
        source: SourceLocation,
        commit: Option<CommitId>,
    },
    ImageBuilt {
        image: ImageRef,
        image_id: Option<ImageId>,
    },
    ImagePushed {
        image: ImageRef,
    },
    DeploymentApplied {
        index: usize,
        name: DeploymentName,
    },
}

/// Receives events as a run progresses. Emission must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}

/// Discards every event.
impl EventSink for () {
    fn emit(&self, _event: &PipelineEvent) {}
}

impl EventSink for mpsc::UnboundedSender<PipelineEvent> {
    fn emit(&self, event: &PipelineEvent) {
        // A closed receiver means nobody is listening any more.
        let _ = self.send(event.clone());
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, event: &PipelineEvent) {
        (**self).emit(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, event: &PipelineEvent) {
        (**self).emit(event)
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<PipelineEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().clone()
    }

    /// The sequence of states visited, starting from the first `from`.
    pub fn states(&self) -> Vec<RunState> {
        let events = self.events.lock();
        let mut states = Vec::new();
        for event in events.iter() {
            if let PipelineEvent::StateChanged { from, to } = event {
                if states.is_empty() {
                    states.push(*from);
                }
                states.push(*to);
            }
        }
        states
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: &PipelineEvent) {
        self.events.lock().push(event.clone());
    }
}
