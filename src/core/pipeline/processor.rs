//! Order processor
//!
//! Handles one received message: parse the order, write it to the blob
//! store, table store, log sink and notification topic in that order, and
//! delete the message only when all four writes succeeded.
//!
//! A failed write leaves the message in the queue so it is redelivered.
//! Earlier writes are not rolled back, so a redelivered message repeats
//! them; `skip_duplicates` turns on a guard keyed by the order id. The
//! guard trusts a completion marker written to the table store after the
//! notification, so an order whose later writes failed is processed again.

use super::retry::{retry_with_backoff, RetryPolicy};
use crate::adapters::services::{Backend, MessageQueue, QueueMessage, Sinks};
use crate::config::OrderflowConfig;
use crate::domain::{Order, OrderId, OrderflowError, Result, ORDER_CONTENT_TYPE};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Sink write stage, in pipeline order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkStage {
    BlobStore,
    TableStore,
    LogSink,
    Notification,
}

impl SinkStage {
    /// Stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkStage::BlobStore => "blob_store",
            SinkStage::TableStore => "table_store",
            SinkStage::LogSink => "log_sink",
            SinkStage::Notification => "notification",
        }
    }
}

impl fmt::Display for SinkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handling one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Written to every sink and deleted from the queue
    Processed { order_id: OrderId },

    /// Already marked as processed; deleted without writing
    DuplicateSkipped { order_id: OrderId },

    /// A sink write failed; the message stays in the queue
    SinkFailed {
        order_id: OrderId,
        stage: SinkStage,
        error: String,
    },

    /// The body is not a valid order
    Malformed { error: String, dead_lettered: bool },

    /// A sink write failed on the last allowed delivery; moved to the dead-letter queue
    DeadLettered {
        order_id: OrderId,
        stage: SinkStage,
        error: String,
    },
}

impl ProcessOutcome {
    /// Order id, when the body could be parsed
    pub fn order_id(&self) -> Option<&OrderId> {
        match self {
            ProcessOutcome::Processed { order_id }
            | ProcessOutcome::DuplicateSkipped { order_id }
            | ProcessOutcome::SinkFailed { order_id, .. }
            | ProcessOutcome::DeadLettered { order_id, .. } => Some(order_id),
            ProcessOutcome::Malformed { .. } => None,
        }
    }

    /// Whether the message was removed from the source queue
    pub fn is_acknowledged(&self) -> bool {
        match self {
            ProcessOutcome::Processed { .. }
            | ProcessOutcome::DuplicateSkipped { .. }
            | ProcessOutcome::DeadLettered { .. } => true,
            ProcessOutcome::Malformed { dead_lettered, .. } => *dead_lettered,
            ProcessOutcome::SinkFailed { .. } => false,
        }
    }
}

/// Processes received messages against the sinks
pub struct OrderProcessor {
    queue: Arc<dyn MessageQueue>,
    dead_letter_queue: Option<Arc<dyn MessageQueue>>,
    sinks: Sinks,
    retry: RetryPolicy,
    skip_duplicates: bool,
    max_receive_count: u32,
}

impl OrderProcessor {
    /// Create a processor without a dead-letter queue or duplicate guard
    pub fn new(queue: Arc<dyn MessageQueue>, sinks: Sinks, retry: RetryPolicy) -> Self {
        Self {
            queue,
            dead_letter_queue: None,
            sinks,
            retry,
            skip_duplicates: false,
            max_receive_count: u32::MAX,
        }
    }

    /// Create a processor for `backend` with the consumer and queue settings of `config`
    pub fn from_config(backend: &Backend, config: &OrderflowConfig) -> Self {
        let mut processor = Self::new(
            backend.queue.clone(),
            backend.sinks.clone(),
            RetryPolicy::from(&config.consumer.retry),
        )
        .with_skip_duplicates(config.consumer.skip_duplicates);

        if let Some(ref dlq) = backend.dead_letter_queue {
            processor = processor.with_dead_letter_queue(dlq.clone(), config.queue.max_receive_count);
        }
        processor
    }

    /// Move malformed messages, and messages still failing after
    /// `max_receive_count` deliveries, to `dlq`
    pub fn with_dead_letter_queue(mut self, dlq: Arc<dyn MessageQueue>, max_receive_count: u32) -> Self {
        self.dead_letter_queue = Some(dlq);
        self.max_receive_count = max_receive_count;
        self
    }

    /// Skip orders already marked as processed in the table store
    pub fn with_skip_duplicates(mut self, skip_duplicates: bool) -> Self {
        self.skip_duplicates = skip_duplicates;
        self
    }

    /// Source queue
    pub fn queue(&self) -> &Arc<dyn MessageQueue> {
        &self.queue
    }

    /// Handle one received message
    ///
    /// Sink failures and malformed bodies are reported through the returned
    /// [`ProcessOutcome`].
    ///
    /// # Errors
    ///
    /// Returns an error only when acknowledging the message fails: the final
    /// delete, or the delete after a move to the dead-letter queue. The
    /// message is then redelivered and its writes repeated.
    pub async fn process(&self, message: &QueueMessage) -> Result<ProcessOutcome> {
        let order = match Order::from_json(&message.body) {
            Ok(order) => order,
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    message_id = %message.message_id,
                    error = %error,
                    "Received malformed order message"
                );
                let dead_lettered = self.dead_letter(message).await?;
                return Ok(ProcessOutcome::Malformed {
                    error,
                    dead_lettered,
                });
            }
        };
        let order_id = order.order_id.clone();

        tracing::debug!(
            order_id = %order_id,
            message_id = %message.message_id,
            receive_count = message.receive_count,
            "Processing order"
        );

        if self.skip_duplicates {
            match self.already_processed(&order_id).await {
                Ok(true) => {
                    tracing::info!(order_id = %order_id, "Order already processed, skipping writes");
                    self.acknowledge(message).await?;
                    return Ok(ProcessOutcome::DuplicateSkipped { order_id });
                }
                Ok(false) => {}
                Err(error) => {
                    return self
                        .sink_failed(message, order_id, SinkStage::TableStore, error)
                        .await;
                }
            }
        }

        if let Err((stage, error)) = self.write_sinks(&order).await {
            return self.sink_failed(message, order_id, stage, error).await;
        }

        if self.skip_duplicates {
            self.mark_processed(&order_id).await;
        }

        self.acknowledge(message).await?;
        crate::log_order_processed!(&order_id, message.receive_count);
        Ok(ProcessOutcome::Processed { order_id })
    }

    async fn already_processed(&self, order_id: &OrderId) -> Result<bool> {
        retry_with_backoff(&self.retry, "table_store.is_processed", || {
            self.sinks.table.is_processed(order_id)
        })
        .await
    }

    /// A missing marker only costs a repeat of the writes on redelivery,
    /// so a failure here does not keep the message
    async fn mark_processed(&self, order_id: &OrderId) {
        if let Err(e) = retry_with_backoff(&self.retry, "table_store.mark_processed", || {
            self.sinks.table.mark_processed(order_id)
        })
        .await
        {
            tracing::warn!(
                order_id = %order_id,
                error = %e,
                "Failed to mark order as processed"
            );
        }
    }

    /// Writes the order to every sink in order, stopping at the first failure
    async fn write_sinks(&self, order: &Order) -> std::result::Result<(), (SinkStage, OrderflowError)> {
        let body = order.to_json().map_err(|e| (SinkStage::BlobStore, e))?;
        let key = order.blob_key();
        retry_with_backoff(&self.retry, SinkStage::BlobStore.as_str(), || {
            self.sinks
                .blob
                .put_object(&key, body.clone().into_bytes(), ORDER_CONTENT_TYPE)
        })
        .await
        .map_err(|e| (SinkStage::BlobStore, e))?;

        retry_with_backoff(&self.retry, SinkStage::TableStore.as_str(), || {
            self.sinks.table.put_item(order)
        })
        .await
        .map_err(|e| (SinkStage::TableStore, e))?;

        let timestamp_ms = Utc::now().timestamp_millis();
        let log_line = order.log_line();
        retry_with_backoff(&self.retry, SinkStage::LogSink.as_str(), || {
            self.sinks.log.put_log_event(timestamp_ms, &log_line)
        })
        .await
        .map_err(|e| (SinkStage::LogSink, e))?;

        let text = order.notification_text();
        retry_with_backoff(&self.retry, SinkStage::Notification.as_str(), || {
            self.sinks.notifier.publish(&text)
        })
        .await
        .map_err(|e| (SinkStage::Notification, e))?;

        Ok(())
    }

    async fn sink_failed(
        &self,
        message: &QueueMessage,
        order_id: OrderId,
        stage: SinkStage,
        error: OrderflowError,
    ) -> Result<ProcessOutcome> {
        crate::log_sink_failure!(&order_id, stage, &error);
        let error = error.to_string();

        if message.receive_count >= self.max_receive_count && self.dead_letter(message).await? {
            return Ok(ProcessOutcome::DeadLettered {
                order_id,
                stage,
                error,
            });
        }

        Ok(ProcessOutcome::SinkFailed {
            order_id,
            stage,
            error,
        })
    }

    /// Copies the message to the dead-letter queue and removes it from the source
    ///
    /// Returns `false` when no dead-letter queue is configured or the copy
    /// failed; the message then stays in the source queue.
    async fn dead_letter(&self, message: &QueueMessage) -> Result<bool> {
        let Some(ref dlq) = self.dead_letter_queue else {
            return Ok(false);
        };

        if let Err(e) = retry_with_backoff(&self.retry, "dead_letter.send", || dlq.send(&message.body)).await {
            tracing::error!(
                message_id = %message.message_id,
                dead_letter_queue = %dlq.name(),
                error = %e,
                "Failed to move message to dead-letter queue"
            );
            return Ok(false);
        }

        self.acknowledge(message).await?;
        tracing::warn!(
            message_id = %message.message_id,
            receive_count = message.receive_count,
            dead_letter_queue = %dlq.name(),
            "Message moved to dead-letter queue"
        );
        Ok(true)
    }

    async fn acknowledge(&self, message: &QueueMessage) -> Result<()> {
        retry_with_backoff(&self.retry, "queue.delete", || {
            self.queue.delete(&message.receipt_handle)
        })
        .await
    }
}
