use std::time::Instant;

use crate::speech::domain::operation::OperationHandle;

/// Cross-cutting logger for transcription job events.
///
/// Decouples the use case from where its progress ends up (log crate, test
/// recorder) so callers can observe a job without changing the orchestration.
pub trait JobLogger: Send {
    /// Report remote operation progress from one poll.
    fn progress(&mut self, operation: &OperationHandle, percent: Option<u32>);

    /// Record how long a named job stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-job summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullJobLogger;

impl JobLogger for NullJobLogger {
    fn progress(&mut self, _operation: &OperationHandle, _percent: Option<u32>) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that forwards to the `log` crate and keeps stage
/// timings for a closing summary.
///
/// Repeated identical progress values are logged once.
pub struct LogJobLogger {
    timings: Vec<(String, f64)>,
    start_time: Instant,
    last_progress: Option<u32>,
    polls: usize,
}

impl LogJobLogger {
    pub fn new() -> Self {
        Self {
            timings: Vec::new(),
            start_time: Instant::now(),
            last_progress: None,
            polls: 0,
        }
    }

    /// Returns the formatted summary string, or `None` if no stage was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Job summary ({} polls, {:.1}s total):",
            self.polls,
            elapsed_ms / 1000.0
        )];
        for (stage, ms) in &self.timings {
            lines.push(format!("  {stage:10}: {ms:9.0}ms"));
        }
        Some(lines.join("\n"))
    }

    #[cfg(test)]
    fn timing_for(&self, stage: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, ms)| *ms)
    }
}

impl Default for LogJobLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl JobLogger for LogJobLogger {
    fn progress(&mut self, operation: &OperationHandle, percent: Option<u32>) {
        self.polls += 1;
        if percent.is_some() && percent == self.last_progress {
            return;
        }
        self.last_progress = percent;
        match percent {
            Some(pct) => log::info!("Operation {operation}: {pct}% complete"),
            None => log::info!("Operation {operation}: running"),
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings.push((stage.to_string(), duration_ms));
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
