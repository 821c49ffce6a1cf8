//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! approximate depth of the source and dead-letter queues.

use super::{connect, exit_code_for, load, EXIT_SUCCESS};
use crate::adapters::MessageQueue;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Checking queue status");

        println!("📊 Queue Status");
        println!();

        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let backend = match connect(&config).await {
            Ok(b) => b,
            Err(code) => return Ok(code),
        };

        let mut queues: Vec<&dyn MessageQueue> = vec![backend.queue.as_ref()];
        if let Some(ref dlq) = backend.dead_letter_queue {
            queues.push(dlq.as_ref());
        }

        println!("{:<40} {:<10}", "Queue", "Messages");
        println!("{}", "-".repeat(52));
        for queue in queues {
            match queue.approximate_len().await {
                Ok(depth) => println!("{:<40} {:<10}", queue.name(), depth),
                Err(e) => {
                    tracing::error!(queue = %queue.name(), error = %e, "Failed to read queue depth");
                    println!("❌ Failed to read depth of {}", queue.name());
                    println!("   Error: {e}");
                    return Ok(exit_code_for(&e));
                }
            }
        }
        println!();

        Ok(EXIT_SUCCESS)
    }
}
