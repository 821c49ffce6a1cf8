//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "orderflow.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Orderflow configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set ORDERFLOW_SECRET_KEY (or remove the static credentials)");
                println!("  3. Validate configuration: orderflow --config {} validate-config", self.output);
                println!("  4. Create resources: orderflow --config {} provision", self.output);
                println!("  5. Send an order: orderflow --config {} send", self.output);
                println!("  6. Process orders: orderflow --config {} consume", self.output);
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate the sample configuration
    fn generate_config() -> String {
        r#"# Orderflow Configuration File
# Queue-driven order pipeline: queue -> blob store -> table -> log -> topic

# Backend: "aws" (AWS or LocalStack) or "memory" (in-process, for demos)
backend = "aws"

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[aws]
# Omit endpoint_url to talk to real AWS
endpoint_url = "http://localhost:4566"
region = "us-east-1"

# Static credentials; remove both to use the default AWS credential chain
access_key_id = "test"
secret_access_key = "${ORDERFLOW_SECRET_KEY}"

[queue]
name = "fila-pedidos"
# Messages that cannot be processed move here
# dead_letter_queue = "fila-pedidos-dlq"
# Deliveries before a failing message is dead-lettered
max_receive_count = 5
# Long-poll duration per receive (0-20)
wait_time_seconds = 0
# visibility_timeout_seconds = 30

[storage]
bucket = "pedidos-processados"
table = "pedidos"

[log_sink]
group = "pedidos-logs"
stream = "stream1"

[notification]
topic = "pedidos-concluidos"

[producer]
product = "Camiseta"
quantity = 2

[consumer]
# Pause between polls
poll_interval_ms = 1000
# Stop after this many messages (0 = until Ctrl+C)
max_messages = 0
# Skip orders already present in the table
skip_duplicates = false
# Give up after this many failed receive calls in a row
max_consecutive_receive_errors = 5

[consumer.retry]
max_retries = 3
initial_delay_ms = 200
max_delay_ms = 5000
backoff_multiplier = 2.0
jitter = true

[logging]
# JSON log files with rotation (daily, hourly, never)
local_enabled = false
local_path = "logs"
local_rotation = "daily"
# Emit console logs as JSON
json_console = false
"#
        .to_string()
    }
}
