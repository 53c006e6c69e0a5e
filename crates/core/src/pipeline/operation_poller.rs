use std::time::Duration;

use crate::pipeline::job_logger::JobLogger;
use crate::shared::constants::{DEFAULT_INITIAL_POLL_DELAY_SECS, DEFAULT_POLL_INTERVAL_SECS};
use crate::speech::domain::operation::{
    OperationError, OperationHandle, OperationPhase, OperationStatus,
};
use crate::speech::domain::transcript::TranscriptResult;
use crate::speech::domain::transcription_service::TranscriptionService;
use crate::BoxError;

pub type SleepFn = Box<dyn Fn(Duration) + Send>;

/// Terminal result of a long-running operation.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationOutcome {
    Succeeded(TranscriptResult),
    Failed(OperationError),
}

/// Blocks until an operation reaches a terminal state.
///
/// Waits `initial_delay` after submission, then polls every `interval`.
/// There is no timeout and no retry: a transport error ends the wait.
pub struct OperationPoller {
    initial_delay: Duration,
    interval: Duration,
    sleep: SleepFn,
}

impl OperationPoller {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            sleep: Box::new(std::thread::sleep),
        }
    }

    /// Replace the sleep function, e.g. with a no-op in tests.
    pub fn with_sleep(mut self, sleep: SleepFn) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn wait(
        &self,
        service: &dyn TranscriptionService,
        handle: &OperationHandle,
        logger: &mut dyn JobLogger,
    ) -> Result<OperationOutcome, BoxError> {
        let mut phase = OperationPhase::Submitted;
        let mut delay = self.initial_delay;

        loop {
            (self.sleep)(delay);
            delay = self.interval;

            let status = service.poll(handle)?;
            let next = phase.advance(&status);
            if next != phase {
                log::debug!("Operation {handle}: {phase} -> {next}");
                phase = next;
            }

            match status {
                OperationStatus::Running { progress_percent } => {
                    logger.progress(handle, progress_percent);
                }
                OperationStatus::Succeeded(result) => return Ok(OperationOutcome::Succeeded(result)),
                OperationStatus::Failed(error) => return Ok(OperationOutcome::Failed(error)),
            }
        }
    }
}

impl Default for OperationPoller {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(DEFAULT_INITIAL_POLL_DELAY_SECS),
            Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        )
    }
}
