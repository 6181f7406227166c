//! Demo progress events and where they go

use tracing::{error, info};

use crate::DemoError;

/// When a free-memory reading was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPhase {
    BeforeInference,
    AfterInference,
}

/// One line of operator-facing demo output
#[derive(Debug, Clone, PartialEq)]
pub enum DemoEvent {
    Started,
    ModelLoaded { elapsed_ms: u64 },
    InferenceStarting,
    FreeMemory {
        phase: MemoryPhase,
        bytes: Option<usize>,
    },
    InferenceFinished { elapsed_ms: u64 },
    ResultsHeader,
    ClassConfidence { label: &'static str, percent: f32 },
    Failed(DemoError),
    Finished,
}

impl DemoEvent {
    /// Whether the event is logged at error severity
    pub fn is_error(&self) -> bool {
        matches!(self, DemoEvent::Failed(_))
    }
}

/// Receives demo events in the order they happen
pub trait EventSink {
    fn emit(&mut self, event: DemoEvent);
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: DemoEvent) {
        match event {
            DemoEvent::Started => info!("Starting gesture recognition..."),
            DemoEvent::ModelLoaded { elapsed_ms } => info!("Model loaded in {} ms", elapsed_ms),
            DemoEvent::InferenceStarting => info!("Starting model inference..."),
            DemoEvent::FreeMemory { phase, bytes } => {
                let when = match phase {
                    MemoryPhase::BeforeInference => "before",
                    MemoryPhase::AfterInference => "after",
                };
                match bytes {
                    Some(bytes) => info!("Free memory {} inference: {} bytes", when, bytes),
                    None => info!("Free memory {} inference: unavailable", when),
                }
            }
            DemoEvent::InferenceFinished { elapsed_ms } => {
                info!("Inference completed in {} ms", elapsed_ms)
            }
            DemoEvent::ResultsHeader => info!("Gesture recognition result:"),
            DemoEvent::ClassConfidence { label, percent } => info!("{}: {:.2}%", label, percent),
            DemoEvent::Failed(e) => error!("{}", e),
            DemoEvent::Finished => info!("Gesture recognition finished"),
        }
    }
}

/// Collects events, for inspection in tests
impl EventSink for Vec<DemoEvent> {
    fn emit(&mut self, event: DemoEvent) {
        self.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut events: Vec<DemoEvent> = Vec::new();
        events.emit(DemoEvent::Started);
        events.emit(DemoEvent::Failed(DemoError::EmptyOutput));
        assert_eq!(events.len(), 2);
        assert!(!events[0].is_error());
        assert!(events[1].is_error());
    }

    #[test]
    fn test_tracing_sink_accepts_all_events() {
        let mut sink = TracingSink;
        sink.emit(DemoEvent::FreeMemory {
            phase: MemoryPhase::AfterInference,
            bytes: None,
        });
        sink.emit(DemoEvent::ClassConfidence {
            label: "palm",
            percent: 12.5,
        });
        sink.emit(DemoEvent::Failed(DemoError::MissingOutput));
    }
}
