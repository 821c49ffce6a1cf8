//! Consumer pipeline
//!
//! - [`processor`] - One message through the four sinks, then delete
//! - [`consumer`] - The receive/process/sleep loop with graceful shutdown
//! - [`retry`] - Exponential backoff for sink writes
//! - [`summary`] - Counters reported when the loop ends

pub mod consumer;
pub mod processor;
pub mod retry;
pub mod summary;

pub use consumer::{OrderConsumer, PollOutcome};
pub use processor::{OrderProcessor, ProcessOutcome, SinkStage};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use summary::{ConsumerSummary, MAX_RECORDED_ERRORS};
