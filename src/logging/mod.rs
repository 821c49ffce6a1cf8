//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable or JSON console output
//! - Configurable log levels, overridable through `RUST_LOG`
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use orderflow::logging::init_logging;
//! use orderflow::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log an order that went through every sink
///
/// # Example
///
/// ```no_run
/// use orderflow::log_order_processed;
/// use orderflow::domain::OrderId;
///
/// let order_id = OrderId::new("pedido-1700000000").unwrap();
/// log_order_processed!(&order_id, 1);
/// ```
#[macro_export]
macro_rules! log_order_processed {
    ($order_id:expr, $receive_count:expr) => {
        tracing::info!(
            order_id = %$order_id,
            receive_count = $receive_count,
            "Order processed"
        );
    };
}

/// Log a sink write that failed after retries
///
/// # Example
///
/// ```no_run
/// use orderflow::log_sink_failure;
/// use orderflow::domain::OrderflowError;
///
/// let error = OrderflowError::Other("boom".to_string());
/// log_sink_failure!("pedido-1", "table_store", &error);
/// ```
#[macro_export]
macro_rules! log_sink_failure {
    ($order_id:expr, $stage:expr, $error:expr) => {
        tracing::error!(
            order_id = %$order_id,
            stage = %$stage,
            error = %$error,
            "Sink write failed, message left in queue"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use orderflow::log_error_with_context;
/// use orderflow::domain::OrderflowError;
///
/// let error = OrderflowError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use orderflow::log_retry_attempt;
/// use std::time::Duration;
///
/// log_retry_attempt!("blob_store", 2, 3, Duration::from_millis(400), "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($operation:expr, $attempt:expr, $max_attempts:expr, $delay:expr, $reason:expr) => {
        tracing::warn!(
            operation = %$operation,
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay.as_millis() as u64,
            reason = %$reason,
            "Retrying operation"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::{OrderId, OrderflowError};
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        let order_id = OrderId::new("pedido-1").unwrap();
        let error = OrderflowError::Other("boom".to_string());

        log_order_processed!(&order_id, 1);
        log_sink_failure!(&order_id, "blob_store", &error);
        log_error_with_context!(&error, "context");
        log_retry_attempt!("blob_store", 1, 3, Duration::from_millis(10), &error);
    }
}
