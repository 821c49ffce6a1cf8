//! Run command implementation
//!
//! This module implements the `run` command: provision the resources, send
//! orders and consume them within one process. It is the only way to drive
//! the whole pipeline on the in-memory backend.

use super::{
    connect, exit_code_for, exit_code_for_summary, load, print_summary, EXIT_CONFIG,
};
use crate::core::pipeline::OrderConsumer;
use crate::core::producer::OrderProducer;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of orders to send before consuming
    #[arg(long, default_value_t = 1)]
    pub count: usize,

    /// Stop after this many messages (0 = until shutdown)
    #[arg(long)]
    pub max_messages: Option<usize>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(count = self.count, "Starting run command");

        let mut config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        if let Some(max_messages) = self.max_messages {
            config.consumer.max_messages = max_messages;
        }
        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG);
        }

        let backend = match connect(&config).await {
            Ok(b) => b,
            Err(code) => return Ok(code),
        };

        if let Err(e) = backend.provision().await {
            tracing::error!(error = %e, "Provisioning failed");
            println!("❌ Failed to provision resources");
            println!("   Error: {e}");
            return Ok(exit_code_for(&e));
        }

        let producer = OrderProducer::new(backend.queue.clone(), config.producer.clone());
        match producer.send_orders(self.count).await {
            Ok(sent) => {
                for order in &sent {
                    println!("📤 Pedido enviado: {}", order.order.order_id);
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Send failed");
                println!("❌ Failed to send order");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        }

        let consumer = OrderConsumer::from_config(&backend, &config, shutdown_signal);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::EXIT_SUCCESS;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_run_on_memory_backend() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
backend = "memory"

[consumer]
poll_interval_ms = 0

[logging]
local_enabled = false
"#
        )
        .unwrap();

        let args = RunArgs {
            count: 2,
            max_messages: Some(2),
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute(file.path().to_str(), rx)
            .await
            .unwrap();

        assert_eq!(code, EXIT_SUCCESS);
    }
}
