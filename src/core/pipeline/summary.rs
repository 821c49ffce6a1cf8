//! Consumer run summary and reporting

use super::processor::ProcessOutcome;
use std::time::Duration;

/// Most error messages a summary keeps; older ones are dropped and counted
pub const MAX_RECORDED_ERRORS: usize = 100;

/// Summary of a consumer run
#[derive(Debug, Clone, Default)]
pub struct ConsumerSummary {
    /// Receive calls made
    pub polls: usize,

    /// Receive calls that returned no message
    pub empty_polls: usize,

    /// Messages received
    pub received: usize,

    /// Orders written to every sink and deleted from the queue
    pub processed: usize,

    /// Orders skipped because they were already marked as processed
    pub duplicates_skipped: usize,

    /// Messages left in the queue after a sink write failed
    pub sink_failures: usize,

    /// Messages whose body was not a valid order
    pub malformed: usize,

    /// Messages moved to the dead-letter queue
    pub dead_lettered: usize,

    /// Failed receive calls
    pub receive_errors: usize,

    /// Messages whose writes succeeded but whose delete failed
    pub acknowledge_errors: usize,

    /// Whether the run was stopped by the shutdown signal
    pub interrupted: bool,

    /// Duration of the run
    pub duration: Duration,

    /// The most recent error messages, at most [`MAX_RECORDED_ERRORS`]
    pub errors: Vec<String>,

    /// Error messages dropped from `errors` to stay within the cap
    pub errors_dropped: usize,
}

impl ConsumerSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Count one handled message
    pub fn record(&mut self, outcome: &ProcessOutcome) {
        self.received += 1;
        match outcome {
            ProcessOutcome::Processed { .. } => self.processed += 1,
            ProcessOutcome::DuplicateSkipped { .. } => self.duplicates_skipped += 1,
            ProcessOutcome::SinkFailed {
                order_id,
                stage,
                error,
            } => {
                self.sink_failures += 1;
                self.push_error(format!("{order_id}: {stage} failed: {error}"));
            }
            ProcessOutcome::Malformed {
                error,
                dead_lettered,
            } => {
                self.malformed += 1;
                if *dead_lettered {
                    self.dead_lettered += 1;
                }
                self.push_error(format!("Malformed message: {error}"));
            }
            ProcessOutcome::DeadLettered {
                order_id,
                stage,
                error,
            } => {
                self.sink_failures += 1;
                self.dead_lettered += 1;
                self.push_error(format!("{order_id}: {stage} failed, dead-lettered: {error}"));
            }
        }
    }

    /// Count one failed receive call
    pub fn record_receive_error(&mut self, error: &str) {
        self.receive_errors += 1;
        self.push_error(format!("Receive failed: {error}"));
    }

    /// Count one message whose final delete failed
    pub fn record_acknowledge_error(&mut self, error: &str) {
        self.received += 1;
        self.acknowledge_errors += 1;
        self.push_error(format!("Delete failed: {error}"));
    }

    fn push_error(&mut self, error: String) {
        if self.errors.len() >= MAX_RECORDED_ERRORS {
            self.errors.remove(0);
            self.errors_dropped += 1;
        }
        self.errors.push(error);
    }

    /// Check if every handled message was processed or skipped as a duplicate
    pub fn is_successful(&self) -> bool {
        self.sink_failures == 0
            && self.malformed == 0
            && self.receive_errors == 0
            && self.acknowledge_errors == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            polls = self.polls,
            empty_polls = self.empty_polls,
            received = self.received,
            processed = self.processed,
            duplicates_skipped = self.duplicates_skipped,
            sink_failures = self.sink_failures,
            malformed = self.malformed,
            dead_lettered = self.dead_lettered,
            receive_errors = self.receive_errors,
            acknowledge_errors = self.acknowledge_errors,
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            "Consumer finished"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len() + self.errors_dropped,
                errors_dropped = self.errors_dropped,
                "Consumer finished with errors"
            );
            for error in &self.errors {
                tracing::warn!(message = %error, "Consumer error");
            }
        }
    }
}
