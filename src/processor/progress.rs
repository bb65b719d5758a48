use serde::Serialize;
use std::fmt;

/// Stage of a processing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStep {
    Validating,
    Extracting,
    Analyzing,
    Formatting,
    Complete,
    Error,
}

impl ProcessingStep {
    /// Fixed milestone reported when the step is entered
    pub fn progress(&self) -> u8 {
        match self {
            ProcessingStep::Validating => 10,
            ProcessingStep::Extracting => 30,
            ProcessingStep::Analyzing => 60,
            ProcessingStep::Formatting => 90,
            ProcessingStep::Complete => 100,
            ProcessingStep::Error => 0,
        }
    }
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStep::Validating => "validating",
            ProcessingStep::Extracting => "extracting",
            ProcessingStep::Analyzing => "analyzing",
            ProcessingStep::Formatting => "formatting",
            ProcessingStep::Complete => "complete",
            ProcessingStep::Error => "error",
        };
        f.write_str(name)
    }
}

/// Transient status update, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub step: ProcessingStep,
    pub progress: u8,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(step: ProcessingStep, message: impl Into<String>) -> Self {
        Self {
            step,
            progress: step.progress(),
            message: message.into(),
        }
    }
}

/// Receives progress events synchronously, in state order
pub type ProgressSink<'a> = dyn FnMut(ProgressEvent) + Send + 'a;

/// Sink for callers that don't care about progress
pub fn ignore_progress(_: ProgressEvent) {}
