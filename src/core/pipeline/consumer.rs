//! Consumer loop
//!
//! Repeats receive-one, process, sleep until the shutdown signal fires or
//! the configured number of messages has been handled. Messages are handled
//! strictly one at a time; the signal is checked between messages, never in
//! the middle of one.

use super::processor::{OrderProcessor, ProcessOutcome};
use super::summary::ConsumerSummary;
use crate::adapters::services::{Backend, MessageQueue, QueueMessage};
use crate::config::{ConsumerConfig, OrderflowConfig};
use crate::domain::{OrderflowError, QueueError, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::sleep;

/// Result of a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No message was available
    Empty,
    /// One message was received and handled
    Handled(ProcessOutcome),
}

/// Drains the source queue through an [`OrderProcessor`]
pub struct OrderConsumer {
    queue: Arc<dyn MessageQueue>,
    processor: OrderProcessor,
    config: ConsumerConfig,
    wait_time: Duration,
    shutdown: watch::Receiver<bool>,
}

impl OrderConsumer {
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        processor: OrderProcessor,
        config: ConsumerConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            queue,
            processor,
            config,
            wait_time: Duration::ZERO,
            shutdown,
        }
    }

    /// Build a consumer and its processor for `backend`
    pub fn from_config(
        backend: &Backend,
        config: &OrderflowConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let processor = OrderProcessor::from_config(backend, config);
        Self::new(
            backend.queue.clone(),
            processor,
            config.consumer.clone(),
            shutdown,
        )
        .with_wait_time(Duration::from_secs(u64::from(config.queue.wait_time_seconds)))
    }

    /// Long-poll each receive for up to `wait_time`
    pub fn with_wait_time(mut self, wait_time: Duration) -> Self {
        self.wait_time = wait_time;
        self
    }

    /// Stop after `max_messages` handled messages (0 = until shutdown)
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.config.max_messages = max_messages;
        self
    }

    /// Receive at most one message and process it
    ///
    /// # Errors
    ///
    /// Returns an error if the receive call fails or the processed message
    /// cannot be deleted.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        match self.queue.receive(self.wait_time).await? {
            None => Ok(PollOutcome::Empty),
            Some(message) => Ok(PollOutcome::Handled(self.processor.process(&message).await?)),
        }
    }

    /// Run until shutdown, until `max_messages` messages were handled, or
    /// until too many consecutive receive calls fail
    ///
    /// # Errors
    ///
    /// Returns an error after `max_consecutive_receive_errors` receive
    /// failures in a row.
    pub async fn run(&self) -> Result<ConsumerSummary> {
        let start_time = Instant::now();
        let mut summary = ConsumerSummary::new();
        let mut shutdown = self.shutdown.clone();
        let mut consecutive_errors = 0;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);

        tracing::info!(
            queue = %self.queue.name(),
            poll_interval_ms = self.config.poll_interval_ms,
            max_messages = self.config.max_messages,
            skip_duplicates = self.config.skip_duplicates,
            "Consumer started"
        );

        loop {
            if *shutdown.borrow() {
                tracing::info!("Shutdown requested, stopping consumer");
                summary.interrupted = true;
                break;
            }

            summary.polls += 1;
            let received = tokio::select! {
                received = self.queue.receive(self.wait_time) => received,
                _ = shutdown_requested(&mut shutdown) => {
                    tracing::info!("Shutdown requested while waiting for messages");
                    summary.interrupted = true;
                    break;
                }
            };

            match received {
                Ok(None) => {
                    consecutive_errors = 0;
                    summary.empty_polls += 1;
                    tracing::trace!(queue = %self.queue.name(), "Queue empty");
                }
                Ok(Some(message)) => {
                    consecutive_errors = 0;
                    self.handle(&message, &mut summary).await;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    summary.record_receive_error(&e.to_string());
                    tracing::warn!(
                        queue = %self.queue.name(),
                        consecutive_errors,
                        max_consecutive_errors = self.config.max_consecutive_receive_errors,
                        error = %e,
                        "Failed to receive message"
                    );

                    if consecutive_errors >= self.config.max_consecutive_receive_errors {
                        summary.duration = start_time.elapsed();
                        summary.log_summary();
                        return Err(OrderflowError::Queue(QueueError::ReceiveFailed(format!(
                            "giving up after {consecutive_errors} consecutive receive failures: {e}"
                        ))));
                    }
                }
            }

            if self.config.max_messages > 0 && summary.received >= self.config.max_messages {
                tracing::info!(
                    received = summary.received,
                    "Message limit reached, stopping consumer"
                );
                break;
            }

            tokio::select! {
                _ = sleep(poll_interval) => {}
                _ = shutdown_requested(&mut shutdown) => {}
            }
        }

        summary.duration = start_time.elapsed();
        Ok(summary)
    }

    async fn handle(&self, message: &QueueMessage, summary: &mut ConsumerSummary) {
        match self.processor.process(message).await {
            Ok(outcome) => summary.record(&outcome),
            Err(e) => {
                crate::log_error_with_context!(&e, "Failed to delete processed message");
                summary.record_acknowledge_error(&e.to_string());
            }
        }
    }
}

/// Resolves once shutdown is signalled; never resolves if the sender is gone
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::services::MemoryBackend;
    use crate::core::pipeline::processor::SinkStage;

    const BODY: &str = r#"{"PedidoId":"pedido-1700000000","Produto":"Camiseta","Quantidade":2}"#;

    fn config() -> OrderflowConfig {
        let mut config = OrderflowConfig::default();
        config.consumer.poll_interval_ms = 0;
        config.consumer.retry.max_retries = 0;
        config
    }

    #[tokio::test]
    async fn test_poll_once_empty() {
        let config = config();
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer = OrderConsumer::from_config(&memory.backend(), &config, rx);

        assert_eq!(consumer.poll_once().await.unwrap(), PollOutcome::Empty);
    }

    #[tokio::test]
    async fn test_poll_once_processes_message() {
        let config = config();
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer = OrderConsumer::from_config(&memory.backend(), &config, rx);
        memory.queue.send(BODY).await.unwrap();

        let outcome = consumer.poll_once().await.unwrap();
        assert!(matches!(
            outcome,
            PollOutcome::Handled(ProcessOutcome::Processed { .. })
        ));
        assert!(memory.queue.is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_at_max_messages() {
        let config = config();
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer =
            OrderConsumer::from_config(&memory.backend(), &config, rx).with_max_messages(2);

        for _ in 0..3 {
            memory.queue.send(BODY).await.unwrap();
        }

        let summary = consumer.run().await.unwrap();
        assert_eq!(summary.received, 2);
        assert_eq!(summary.processed, 2);
        assert!(!summary.interrupted);
        assert!(summary.is_successful());
        assert_eq!(memory.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_run_counts_sink_failures() {
        let config = config();
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer =
            OrderConsumer::from_config(&memory.backend(), &config, rx).with_max_messages(1);
        memory.queue.send(BODY).await.unwrap();
        memory.log.faults().fail_always();

        let summary = consumer.run().await.unwrap();
        assert_eq!(summary.sink_failures, 1);
        assert!(!summary.is_successful());
        assert!(summary.errors[0].contains(SinkStage::LogSink.as_str()));
        assert_eq!(memory.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_run_returns_immediately_when_already_shut_down() {
        let config = config();
        let memory = MemoryBackend::from_config(&config);
        let (tx, rx) = watch::channel(false);
        let consumer = OrderConsumer::from_config(&memory.backend(), &config, rx);
        memory.queue.send(BODY).await.unwrap();
        tx.send(true).unwrap();

        let summary = consumer.run().await.unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.polls, 0);
        assert_eq!(memory.queue.len(), 1);
    }

    #[tokio::test]
    async fn test_run_gives_up_after_consecutive_receive_errors() {
        let mut config = config();
        config.consumer.max_consecutive_receive_errors = 3;
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer = OrderConsumer::from_config(&memory.backend(), &config, rx);
        memory.queue.faults().fail_always();

        let result = consumer.run().await;
        assert!(matches!(
            result,
            Err(OrderflowError::Queue(QueueError::ReceiveFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_tolerates_intermittent_receive_errors() {
        let mut config = config();
        config.consumer.max_consecutive_receive_errors = 3;
        let memory = MemoryBackend::from_config(&config);
        let (_tx, rx) = watch::channel(false);
        let consumer =
            OrderConsumer::from_config(&memory.backend(), &config, rx).with_max_messages(1);
        memory.queue.send(BODY).await.unwrap();
        memory.queue.faults().fail_next(2);

        let summary = consumer.run().await.unwrap();
        assert_eq!(summary.receive_errors, 2);
        assert_eq!(summary.processed, 1);
    }
}
