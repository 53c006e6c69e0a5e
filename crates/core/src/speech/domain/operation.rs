use std::fmt;

use thiserror::Error;

use super::transcript::TranscriptResult;

/// Opaque name of a long-running recognition job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationHandle {
    pub name: String,
}

impl OperationHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Error payload of a failed operation, as reported by the service.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("code {code}: {message}")]
pub struct OperationError {
    pub code: i32,
    pub message: String,
}

/// Snapshot of an operation returned by one poll.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationStatus {
    Running { progress_percent: Option<u32> },
    Succeeded(TranscriptResult),
    Failed(OperationError),
}

impl OperationStatus {
    pub fn is_done(&self) -> bool {
        !matches!(self, OperationStatus::Running { .. })
    }
}

/// Lifecycle of an operation as seen by the runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationPhase {
    Submitted,
    Polling,
    Succeeded,
    Failed,
}

impl OperationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationPhase::Succeeded | OperationPhase::Failed)
    }

    /// Phase after observing `status`. Terminal phases never change.
    pub fn advance(self, status: &OperationStatus) -> OperationPhase {
        if self.is_terminal() {
            return self;
        }
        match status {
            OperationStatus::Running { .. } => OperationPhase::Polling,
            OperationStatus::Succeeded(_) => OperationPhase::Succeeded,
            OperationStatus::Failed(_) => OperationPhase::Failed,
        }
    }
}

impl fmt::Display for OperationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationPhase::Submitted => write!(f, "submitted"),
            OperationPhase::Polling => write!(f, "polling"),
            OperationPhase::Succeeded => write!(f, "succeeded"),
            OperationPhase::Failed => write!(f, "failed"),
        }
    }
}
