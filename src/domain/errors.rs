//! Domain error types
//!
//! This module defines the error hierarchy for Orderflow.
//! All errors are domain-specific and don't expose AWS SDK types.

use thiserror::Error;

/// Main Orderflow error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum OrderflowError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Message queue errors
    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    /// Sink (blob, table, log, notification) errors
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A message body could not be turned into an order
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Network/connection errors while setting up clients
    #[error("Connection error: {0}")]
    Connection(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl OrderflowError {
    /// Whether retrying the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            OrderflowError::Queue(e) => e.is_retryable(),
            OrderflowError::Sink(e) => e.is_retryable(),
            OrderflowError::Connection(_) => true,
            _ => false,
        }
    }
}

/// Queue-specific errors
///
/// Errors that occur when interacting with the message queue.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Failed to reach the queue service
    #[error("Failed to connect to queue service: {0}")]
    ConnectionFailed(String),

    /// The queue does not exist
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    /// Failed to create the queue
    #[error("Failed to create queue: {0}")]
    CreationFailed(String),

    /// Failed to enqueue a message
    #[error("Failed to send message: {0}")]
    SendFailed(String),

    /// Failed to receive messages
    #[error("Failed to receive message: {0}")]
    ReceiveFailed(String),

    /// Failed to delete (acknowledge) a message
    #[error("Failed to delete message: {0}")]
    DeleteFailed(String),

    /// The receipt handle is unknown or no longer current
    #[error("Invalid receipt handle: {0}")]
    InvalidReceiptHandle(String),

    /// Request throttled by the service
    #[error("Queue request throttled: {0}")]
    Throttled(String),

    /// Timeout
    #[error("Queue request timeout: {0}")]
    Timeout(String),
}

impl QueueError {
    /// Whether retrying the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QueueError::ConnectionFailed(_)
                | QueueError::Throttled(_)
                | QueueError::Timeout(_)
                | QueueError::ReceiveFailed(_)
        )
    }
}

/// Sink-specific errors
///
/// Errors that occur when writing to the blob store, table store,
/// log sink or notification topic.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Failed to reach the service
    #[error("Failed to connect to {sink}: {message}")]
    ConnectionFailed { sink: String, message: String },

    /// Request throttled by the service
    #[error("Request to {sink} throttled: {message}")]
    Throttled { sink: String, message: String },

    /// Timeout
    #[error("Request to {sink} timed out: {message}")]
    Timeout { sink: String, message: String },

    /// Bucket, table, log group/stream or topic does not exist
    #[error("Resource not found in {sink}: {message}")]
    ResourceNotFound { sink: String, message: String },

    /// Request rejected as invalid or unauthorized
    #[error("Request to {sink} rejected: {message}")]
    Rejected { sink: String, message: String },

    /// Write failed for another reason
    #[error("Write to {sink} failed: {message}")]
    WriteFailed { sink: String, message: String },

    /// Failed to create the backing resource
    #[error("Failed to provision {sink}: {message}")]
    ProvisionFailed { sink: String, message: String },
}

impl SinkError {
    /// Whether retrying the failed write may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SinkError::ConnectionFailed { .. }
                | SinkError::Throttled { .. }
                | SinkError::Timeout { .. }
                | SinkError::WriteFailed { .. }
        )
    }

    /// Name of the sink that failed
    pub fn sink(&self) -> &str {
        match self {
            SinkError::ConnectionFailed { sink, .. }
            | SinkError::Throttled { sink, .. }
            | SinkError::Timeout { sink, .. }
            | SinkError::ResourceNotFound { sink, .. }
            | SinkError::Rejected { sink, .. }
            | SinkError::WriteFailed { sink, .. }
            | SinkError::ProvisionFailed { sink, .. } => sink,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for OrderflowError {
    fn from(err: std::io::Error) -> Self {
        OrderflowError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for OrderflowError {
    fn from(err: serde_json::Error) -> Self {
        OrderflowError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for OrderflowError {
    fn from(err: toml::de::Error) -> Self {
        OrderflowError::Configuration(format!("TOML parse error: {err}"))
    }
}
