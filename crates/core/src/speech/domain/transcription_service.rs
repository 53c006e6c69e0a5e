use super::operation::{OperationHandle, OperationStatus};
use super::recognition_config::RecognitionRequest;
use crate::BoxError;

/// Domain interface for the remote long-running speech recognition service.
pub trait TranscriptionService: Send {
    /// Start a recognition job and return its handle without waiting.
    fn submit(&self, request: &RecognitionRequest) -> Result<OperationHandle, BoxError>;

    /// Fetch the current status of a job once.
    fn poll(&self, handle: &OperationHandle) -> Result<OperationStatus, BoxError>;
}
