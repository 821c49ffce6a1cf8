//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Orderflow configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config_or_default, BackendKind};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let source = config_path.unwrap_or("<built-in defaults>");
        tracing::info!(config_path = %source, "Validating configuration");

        println!("🔍 Validating configuration: {source}");
        println!();

        // Loading runs validation too
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Backend: {}", config.backend);
        if config.backend == BackendKind::Aws {
            println!(
                "  Endpoint: {}",
                config.aws.endpoint_url.as_deref().unwrap_or("<default>")
            );
            println!("  Region: {}", config.aws.region);
            println!(
                "  Credentials: {}",
                if config.aws.has_static_credentials() {
                    "static"
                } else {
                    "default chain"
                }
            );
        }
        println!("  Queue: {}", config.queue.name);
        println!(
            "  Dead-letter Queue: {}",
            config.queue.dead_letter_queue.as_deref().unwrap_or("<none>")
        );
        println!("  Bucket: {}", config.storage.bucket);
        println!("  Table: {}", config.storage.table);
        println!(
            "  Log Stream: {}/{}",
            config.log_sink.group, config.log_sink.stream
        );
        println!("  Topic: {}", config.notification.topic);
        println!("  Poll Interval: {}ms", config.consumer.poll_interval_ms);
        println!("  Max Retries: {}", config.consumer.retry.max_retries);
        println!("  Skip Duplicates: {}", config.consumer.skip_duplicates);
        println!();

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend = \"memory\"").unwrap();

        let code = ValidateArgs {}.execute(file.path().to_str()).await.unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[application]
log_level = "loud"
"#
        )
        .unwrap();

        let code = ValidateArgs {}.execute(file.path().to_str()).await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute(Some("/nonexistent/orderflow.toml"))
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
