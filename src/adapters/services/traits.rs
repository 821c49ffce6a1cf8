//! Service abstraction traits
//!
//! This module defines the traits that queue and sink adapters must implement
//! to work with Orderflow. Each trait has an AWS implementation and an
//! in-memory implementation.

use crate::domain::{Order, OrderId, Result};
use async_trait::async_trait;
use std::time::Duration;

/// A message received from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Service-assigned message id
    pub message_id: String,

    /// Handle used to delete (acknowledge) this delivery
    pub receipt_handle: String,

    /// Raw message body
    pub body: String,

    /// How many times the queue has delivered this message, including this time
    pub receive_count: u32,
}

/// Message queue with explicit receive/delete (acknowledge) semantics
///
/// Delivery is at-least-once: a received message that is not deleted
/// becomes visible again and is redelivered.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Queue name
    fn name(&self) -> &str;

    /// Create the queue if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be created or accessed.
    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    /// Enqueue a message body
    ///
    /// # Returns
    ///
    /// The service-assigned message id.
    async fn send(&self, body: &str) -> Result<String>;

    /// Receive at most one message, waiting up to `wait` for one to arrive
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the queue is empty.
    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>>;

    /// Delete a delivered message
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt handle is unknown or the request fails.
    async fn delete(&self, receipt_handle: &str) -> Result<()>;

    /// Approximate number of messages waiting in the queue
    async fn approximate_len(&self) -> Result<u64>;
}

/// Key-addressed object storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket name
    fn bucket(&self) -> &str;

    /// Create the bucket if it does not exist
    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    /// Store `body` under `key`, replacing any existing object
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// Key-addressed record storage for orders
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Table name
    fn table_name(&self) -> &str;

    /// Create the table if it does not exist
    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    /// Write the order as one item keyed by its id, replacing any existing item
    async fn put_item(&self, order: &Order) -> Result<()>;

    /// Whether the order was marked as fully processed
    ///
    /// An item written by `put_item` alone is not processed: the later
    /// sinks may not have been reached.
    async fn is_processed(&self, order_id: &OrderId) -> Result<bool>;

    /// Record that every sink write for the order succeeded
    async fn mark_processed(&self, order_id: &OrderId) -> Result<()>;
}

/// Append-only timestamped event stream
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Human-readable destination, e.g. `group/stream`
    fn destination(&self) -> String;

    /// Create the log group and stream if they do not exist
    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    /// Append one event
    async fn put_log_event(&self, timestamp_ms: i64, message: &str) -> Result<()>;
}

/// Publish/subscribe fan-out channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Topic name
    fn topic(&self) -> &str;

    /// Create the topic if it does not exist
    async fn ensure_exists(&self) -> Result<()> {
        Ok(())
    }

    /// Publish a plain-text message
    ///
    /// # Returns
    ///
    /// The service-assigned message id.
    async fn publish(&self, message: &str) -> Result<String>;
}
