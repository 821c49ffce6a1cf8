//! Consume command implementation
//!
//! This module implements the `consume` command, the consumer side of the
//! pipeline.

use super::{
    connect, exit_code_for, exit_code_for_summary, load, print_summary, EXIT_PARTIAL,
    EXIT_SUCCESS,
};
use crate::core::pipeline::{OrderConsumer, PollOutcome, ProcessOutcome};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the consume command
#[derive(Args, Debug)]
pub struct ConsumeArgs {
    /// Poll the queue once and exit
    #[arg(long)]
    pub once: bool,

    /// Stop after this many messages (0 = until shutdown)
    #[arg(long)]
    pub max_messages: Option<usize>,
}

impl ConsumeArgs {
    /// Execute the consume command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(once = self.once, "Starting consume command");

        let mut config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        if let Some(max_messages) = self.max_messages {
            config.consumer.max_messages = max_messages;
        }

        let backend = match connect(&config).await {
            Ok(b) => b,
            Err(code) => return Ok(code),
        };
        let consumer = OrderConsumer::from_config(&backend, &config, shutdown_signal);

        if self.once {
            return match consumer.poll_once().await {
                Ok(outcome) => Ok(report_poll(&outcome)),
                Err(e) => {
                    tracing::error!(error = %e, "Poll failed");
                    println!("❌ Poll failed");
                    println!("   Error: {e}");
                    Ok(exit_code_for(&e))
                }
            };
        }

        println!("📥 Consuming from {} (Ctrl+C to stop)", config.queue.name);
        match consumer.run().await {
            Ok(summary) => {
                summary.log_summary();
                print_summary(&summary);
                Ok(exit_code_for_summary(&summary))
            }
            Err(e) => {
                tracing::error!(error = %e, "Consumer failed");
                eprintln!("Consumer failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

/// Print the result of a single poll and return its exit code
fn report_poll(outcome: &PollOutcome) -> i32 {
    match outcome {
        PollOutcome::Empty => {
            println!("📭 No message available");
            EXIT_SUCCESS
        }
        PollOutcome::Handled(ProcessOutcome::Processed { order_id }) => {
            println!("✅ Pedido processado: {order_id}");
            EXIT_SUCCESS
        }
        PollOutcome::Handled(ProcessOutcome::DuplicateSkipped { order_id }) => {
            println!("⏭️  Pedido {order_id} already processed, skipped");
            EXIT_SUCCESS
        }
        PollOutcome::Handled(ProcessOutcome::SinkFailed {
            order_id,
            stage,
            error,
        }) => {
            println!("❌ Pedido {order_id}: {stage} failed, message kept in queue");
            println!("   Error: {error}");
            EXIT_PARTIAL
        }
        PollOutcome::Handled(ProcessOutcome::DeadLettered {
            order_id,
            stage,
            error,
        }) => {
            println!("❌ Pedido {order_id}: {stage} failed, moved to dead-letter queue");
            println!("   Error: {error}");
            EXIT_PARTIAL
        }
        PollOutcome::Handled(ProcessOutcome::Malformed {
            error,
            dead_lettered,
        }) => {
            let action = if *dead_lettered {
                "moved to dead-letter queue"
            } else {
                "kept in queue"
            };
            println!("❌ Malformed message {action}");
            println!("   Error: {error}");
            EXIT_PARTIAL
        }
    }
}
