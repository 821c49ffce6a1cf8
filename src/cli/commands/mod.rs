//! CLI command implementations
//!
//! This module contains all CLI command implementations plus the shared
//! exit code conventions:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed with failures |
//! | 2 | Configuration error |
//! | 4 | Connection error |
//! | 5 | Fatal error |
//! | 130 | Interrupted by a shutdown signal |

pub mod consume;
pub mod init;
pub mod provision;
pub mod run;
pub mod send;
pub mod status;
pub mod validate;

use crate::adapters::{build_backend, Backend};
use crate::config::{load_config_or_default, OrderflowConfig};
use crate::core::pipeline::ConsumerSummary;
use crate::domain::{OrderflowError, QueueError, SinkError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARTIAL: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;
pub const EXIT_INTERRUPTED: i32 = 130;

/// Map an error to the process exit code
pub fn exit_code_for(error: &OrderflowError) -> i32 {
    match error {
        OrderflowError::Configuration(_) => EXIT_CONFIG,
        OrderflowError::Connection(_)
        | OrderflowError::Queue(QueueError::ConnectionFailed(_))
        | OrderflowError::Queue(QueueError::QueueNotFound(_))
        | OrderflowError::Sink(SinkError::ConnectionFailed { .. }) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

/// Map a finished consumer run to the process exit code
pub fn exit_code_for_summary(summary: &ConsumerSummary) -> i32 {
    if summary.interrupted {
        EXIT_INTERRUPTED
    } else if summary.is_successful() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    }
}

/// Load the configuration, printing the failure and its exit code on error
pub(crate) fn load(config_path: Option<&str>) -> Result<OrderflowConfig, i32> {
    load_config_or_default(config_path).map_err(|e| {
        println!("❌ Failed to load configuration");
        println!("   Error: {e}");
        exit_code_for(&e)
    })
}

/// Connect to the configured backend, printing the failure on error
pub(crate) async fn connect(config: &OrderflowConfig) -> Result<Backend, i32> {
    build_backend(config).await.map_err(|e| {
        println!("❌ Failed to connect to {} backend", config.backend);
        println!("   Error: {e}");
        exit_code_for(&e)
    })
}

/// Print the counters of a finished consumer run
pub(crate) fn print_summary(summary: &ConsumerSummary) {
    println!();
    println!("📊 Consumer Summary:");
    println!("  Received: {}", summary.received);
    println!("  Processed: {}", summary.processed);
    println!("  Duplicates Skipped: {}", summary.duplicates_skipped);
    println!("  Sink Failures: {}", summary.sink_failures);
    println!("  Malformed: {}", summary.malformed);
    println!("  Dead-lettered: {}", summary.dead_lettered);
    println!("  Receive Errors: {}", summary.receive_errors);
    println!("  Delete Errors: {}", summary.acknowledge_errors);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in summary.errors.iter().take(10) {
            println!("  - {error}");
        }
        let more = summary.errors.len().saturating_sub(10) + summary.errors_dropped;
        if more > 0 {
            println!("  ... and {more} more errors");
        }
        println!();
    }

    if summary.interrupted {
        println!("⚠️  Consumer stopped by shutdown signal.");
    } else if summary.is_successful() {
        println!("✅ Consumer finished successfully!");
    } else {
        println!("⚠️  Consumer finished with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(OrderflowError::Configuration("bad".into()), EXIT_CONFIG; "configuration")]
    #[test_case(OrderflowError::Connection("refused".into()), EXIT_CONNECTION; "connection")]
    #[test_case(QueueError::ConnectionFailed("refused".into()).into(), EXIT_CONNECTION; "queue connection")]
    #[test_case(QueueError::QueueNotFound("fila-pedidos".into()).into(), EXIT_CONNECTION; "queue missing")]
    #[test_case(
        SinkError::ConnectionFailed { sink: "s3".into(), message: "refused".into() }.into(),
        EXIT_CONNECTION;
        "sink connection"
    )]
    #[test_case(QueueError::SendFailed("rejected".into()).into(), EXIT_FATAL; "send failed")]
    #[test_case(OrderflowError::Other("boom".into()), EXIT_FATAL; "other")]
    fn test_exit_code_for(error: OrderflowError, expected: i32) {
        assert_eq!(exit_code_for(&error), expected);
    }

    #[test]
    fn test_exit_code_for_summary() {
        let mut summary = ConsumerSummary::new();
        assert_eq!(exit_code_for_summary(&summary), EXIT_SUCCESS);

        summary.record_receive_error("refused");
        assert_eq!(exit_code_for_summary(&summary), EXIT_PARTIAL);

        summary.interrupted = true;
        assert_eq!(exit_code_for_summary(&summary), EXIT_INTERRUPTED);
    }
}
