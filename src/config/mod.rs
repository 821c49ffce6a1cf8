//! Configuration management for Orderflow.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Orderflow uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `ORDERFLOW_*` environment overrides
//! - Default values for every setting (a LocalStack setup out of the box)
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use orderflow::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("orderflow.toml")?;
//!
//! println!("Queue: {}", config.queue.name);
//! println!("Bucket: {}", config.storage.bucket);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! backend = "aws"
//!
//! [aws]
//! endpoint_url = "http://localhost:4566"
//! region = "us-east-1"
//! access_key_id = "test"
//! secret_access_key = "${ORDERFLOW_SECRET_KEY}"
//!
//! [queue]
//! name = "fila-pedidos"
//! dead_letter_queue = "fila-pedidos-dlq"
//!
//! [storage]
//! bucket = "pedidos-processados"
//! table = "pedidos"
//!
//! [consumer.retry]
//! max_retries = 3
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, load_default_config};
pub use schema::{
    ApplicationConfig, AwsConfig, BackendKind, ConsumerConfig, LogSinkConfig, LoggingConfig,
    NotificationConfig, OrderflowConfig, ProducerConfig, QueueConfig, RetryConfig, StorageConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
