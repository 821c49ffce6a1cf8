//! Provision command implementation
//!
//! Creates every resource the pipeline touches. Each step is idempotent, so
//! the command can be rerun safely.

use super::{connect, exit_code_for, load, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the provision command
#[derive(Args, Debug)]
pub struct ProvisionArgs {}

impl ProvisionArgs {
    /// Execute the provision command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Provisioning resources");

        println!("🔧 Provisioning resources");
        println!();

        let config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let backend = match connect(&config).await {
            Ok(b) => b,
            Err(code) => return Ok(code),
        };

        match backend.provision().await {
            Ok(()) => {
                println!("  Queue: {}", config.queue.name);
                if let Some(ref dlq) = config.queue.dead_letter_queue {
                    println!("  Dead-letter Queue: {dlq}");
                }
                println!("  Bucket: {}", config.storage.bucket);
                println!("  Table: {}", config.storage.table);
                println!(
                    "  Log Stream: {}/{}",
                    config.log_sink.group, config.log_sink.stream
                );
                println!("  Topic: {}", config.notification.topic);
                println!();
                println!("✅ All resources are ready");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Provisioning failed");
                println!("❌ Failed to provision resources");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_provision_memory_backend() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"memory\"").unwrap();

        let code = ProvisionArgs {}
            .execute(file.path().to_str())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
