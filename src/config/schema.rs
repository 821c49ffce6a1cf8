//! Configuration schema types
//!
//! Every section has defaults that reproduce a LocalStack setup with the
//! `fila-pedidos` queue, `pedidos-processados` bucket, `pedidos` table,
//! `pedidos-logs`/`stream1` log stream and `pedidos-concluidos` topic.

use crate::config::{secret_string, SecretString};
use serde::{Deserialize, Serialize};

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// AWS services (or a LocalStack endpoint)
    #[default]
    Aws,
    /// In-process queue and sinks
    Memory,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Aws => write!(f, "aws"),
            BackendKind::Memory => write!(f, "memory"),
        }
    }
}

/// Main Orderflow configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderflowConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend (aws or memory)
    #[serde(default)]
    pub backend: BackendKind,

    /// AWS connection settings
    #[serde(default)]
    pub aws: AwsConfig,

    /// Queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Blob and table store settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log sink settings
    #[serde(default)]
    pub log_sink: LogSinkConfig,

    /// Notification topic settings
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Producer settings
    #[serde(default)]
    pub producer: ProducerConfig,

    /// Consumer loop settings
    #[serde(default)]
    pub consumer: ConsumerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl OrderflowConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        if self.backend == BackendKind::Aws {
            self.aws.validate()?;
        }
        self.queue.validate()?;
        self.storage.validate()?;
        self.log_sink.validate()?;
        self.notification.validate()?;
        self.producer.validate()?;
        self.consumer.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// AWS connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Endpoint override (LocalStack by default); unset means the real AWS endpoints
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: Option<String>,

    /// AWS region
    #[serde(default = "default_region")]
    pub region: String,

    /// Static access key id; unset means the default credential chain
    #[serde(default = "default_access_key_id")]
    pub access_key_id: Option<String>,

    /// Static secret access key
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default = "default_secret_access_key")]
    pub secret_access_key: Option<SecretString>,
}

impl AwsConfig {
    fn validate(&self) -> Result<(), String> {
        if self.region.trim().is_empty() {
            return Err("aws.region cannot be empty".to_string());
        }

        if let Some(ref endpoint) = self.endpoint_url {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("aws.endpoint_url must start with http:// or https://".to_string());
            }
        }

        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => Err(
                "aws.secret_access_key is required when aws.access_key_id is set".to_string(),
            ),
            (None, Some(_)) => Err(
                "aws.access_key_id is required when aws.secret_access_key is set".to_string(),
            ),
            _ => Ok(()),
        }
    }

    /// Whether static credentials are configured
    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            region: default_region(),
            access_key_id: default_access_key_id(),
            secret_access_key: default_secret_access_key(),
        }
    }
}

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Source queue name
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// Dead-letter queue name (disabled when unset)
    #[serde(default)]
    pub dead_letter_queue: Option<String>,

    /// Deliveries after which a failing message is dead-lettered
    #[serde(default = "default_max_receive_count")]
    pub max_receive_count: u32,

    /// Long-poll wait in seconds (0 = short poll)
    #[serde(default)]
    pub wait_time_seconds: u32,

    /// Visibility timeout applied on receive (queue default when unset)
    #[serde(default)]
    pub visibility_timeout_seconds: Option<u32>,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), String> {
        validate_queue_name("queue.name", &self.name)?;

        if let Some(ref dlq) = self.dead_letter_queue {
            validate_queue_name("queue.dead_letter_queue", dlq)?;
            if dlq == &self.name {
                return Err("queue.dead_letter_queue must differ from queue.name".to_string());
            }
        }

        if self.max_receive_count == 0 {
            return Err("queue.max_receive_count must be > 0".to_string());
        }

        if self.wait_time_seconds > 20 {
            return Err("queue.wait_time_seconds cannot exceed 20".to_string());
        }

        if let Some(timeout) = self.visibility_timeout_seconds {
            if timeout > 43_200 {
                return Err("queue.visibility_timeout_seconds cannot exceed 43200".to_string());
            }
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            dead_letter_queue: None,
            max_receive_count: default_max_receive_count(),
            wait_time_seconds: 0,
            visibility_timeout_seconds: None,
        }
    }
}

fn validate_queue_name(field: &str, name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 80 {
        return Err(format!("{field} must be 1-80 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "{field} may only contain alphanumeric characters, hyphens and underscores"
        ));
    }
    Ok(())
}

/// Blob and table store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket receiving one `<order_id>.json` object per order
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Table receiving one item per order
    #[serde(default = "default_table")]
    pub table: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bucket.len() < 3 || self.bucket.len() > 63 {
            return Err("storage.bucket must be 3-63 characters".to_string());
        }
        if self
            .bucket
            .chars()
            .any(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.'))
        {
            return Err(
                "storage.bucket may only contain lowercase letters, digits, hyphens and dots"
                    .to_string(),
            );
        }
        if self.table.len() < 3 || self.table.len() > 255 {
            return Err("storage.table must be 3-255 characters".to_string());
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            table: default_table(),
        }
    }
}

/// Log sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSinkConfig {
    /// Log group name
    #[serde(default = "default_log_group")]
    pub group: String,

    /// Log stream name
    #[serde(default = "default_log_stream")]
    pub stream: String,
}

impl LogSinkConfig {
    fn validate(&self) -> Result<(), String> {
        if self.group.trim().is_empty() {
            return Err("log_sink.group cannot be empty".to_string());
        }
        if self.stream.trim().is_empty() {
            return Err("log_sink.stream cannot be empty".to_string());
        }
        if self.stream.contains(':') || self.stream.contains('*') {
            return Err("log_sink.stream cannot contain ':' or '*'".to_string());
        }
        Ok(())
    }
}

impl Default for LogSinkConfig {
    fn default() -> Self {
        Self {
            group: default_log_group(),
            stream: default_log_stream(),
        }
    }
}

/// Notification topic configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Topic name
    #[serde(default = "default_topic")]
    pub topic: String,
}

impl NotificationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.topic.is_empty() || self.topic.len() > 256 {
            return Err("notification.topic must be 1-256 characters".to_string());
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
        }
    }
}

/// Producer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Product of generated orders
    #[serde(default = "default_product")]
    pub product: String,

    /// Quantity of generated orders
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl ProducerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.product.trim().is_empty() {
            return Err("producer.product cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            product: default_product(),
            quantity: default_quantity(),
        }
    }
}

/// Retry configuration for sink writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = single attempt)
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to each delay
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("consumer.retry.max_retries cannot exceed 10".to_string());
        }
        if self.backoff_multiplier < 1.0 {
            return Err("consumer.retry.backoff_multiplier must be >= 1.0".to_string());
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(
                "consumer.retry.initial_delay_ms cannot exceed consumer.retry.max_delay_ms"
                    .to_string(),
            );
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Consumer loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// Sleep between polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop after handling this many messages (0 = run until stopped)
    #[serde(default)]
    pub max_messages: usize,

    /// Skip sink writes for orders already present in the table store
    #[serde(default)]
    pub skip_duplicates: bool,

    /// Consecutive receive failures tolerated before the loop gives up
    #[serde(default = "default_max_consecutive_receive_errors")]
    pub max_consecutive_receive_errors: usize,

    /// Retry policy for sink writes
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ConsumerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms > 3_600_000 {
            return Err("consumer.poll_interval_ms cannot exceed one hour".to_string());
        }
        if self.max_consecutive_receive_errors == 0 {
            return Err("consumer.max_consecutive_receive_errors must be > 0".to_string());
        }
        self.retry.validate()
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_messages: 0,
            skip_duplicates: false,
            max_consecutive_receive_errors: default_max_consecutive_receive_errors(),
            retry: RetryConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Emit console logs as JSON
    #[serde(default)]
    pub json_console: bool,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            json_console: false,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_endpoint_url() -> Option<String> {
    Some("http://localhost:4566".to_string())
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_access_key_id() -> Option<String> {
    Some("test".to_string())
}

fn default_secret_access_key() -> Option<SecretString> {
    Some(secret_string("test".to_string()))
}

fn default_queue_name() -> String {
    "fila-pedidos".to_string()
}

fn default_max_receive_count() -> u32 {
    5
}

fn default_bucket() -> String {
    "pedidos-processados".to_string()
}

fn default_table() -> String {
    "pedidos".to_string()
}

fn default_log_group() -> String {
    "pedidos-logs".to_string()
}

fn default_log_stream() -> String {
    "stream1".to_string()
}

fn default_topic() -> String {
    "pedidos-concluidos".to_string()
}

fn default_product() -> String {
    "Camiseta".to_string()
}

fn default_quantity() -> i64 {
    2
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_max_consecutive_receive_errors() -> usize {
    5
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = OrderflowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend, BackendKind::Aws);
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_aws_config_validation() {
        let mut config = AwsConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.has_static_credentials());

        config.endpoint_url = Some("localhost:4566".to_string());
        assert!(config.validate().is_err());

        config.endpoint_url = None;
        config.secret_access_key = None;
        assert!(config.validate().is_err());

        config.access_key_id = None;
        assert!(config.validate().is_ok());
        assert!(!config.has_static_credentials());

        config.region = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_queue_config_validation() {
        let mut config = QueueConfig::default();
        assert!(config.validate().is_ok());

        config.name = "fila pedidos".to_string();
        assert!(config.validate().is_err());

        config.name = "fila-pedidos".to_string();
        config.dead_letter_queue = Some("fila-pedidos".to_string());
        assert!(config.validate().is_err());

        config.dead_letter_queue = Some("fila-pedidos-dlq".to_string());
        assert!(config.validate().is_ok());

        config.max_receive_count = 0;
        assert!(config.validate().is_err());

        config.max_receive_count = 3;
        config.wait_time_seconds = 21;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_config_validation() {
        let mut config = StorageConfig::default();
        assert!(config.validate().is_ok());

        config.bucket = "Pedidos_Processados".to_string();
        assert!(config.validate().is_err());

        config.bucket = "pedidos".to_string();
        config.table = "p".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_sink_config_validation() {
        let mut config = LogSinkConfig::default();
        assert!(config.validate().is_ok());

        config.stream = "stream:1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_config_validation() {
        let mut config = RetryConfig::default();
        assert!(config.validate().is_ok());

        config.max_retries = 11;
        assert!(config.validate().is_err());

        config.max_retries = 2;
        config.backoff_multiplier = 0.5;
        assert!(config.validate().is_err());

        config.backoff_multiplier = 2.0;
        config.initial_delay_ms = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.local_enabled);
        assert_eq!(config.local_path, "logs");
        assert_eq!(config.local_rotation, "daily");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_skips_aws_validation() {
        let mut config = OrderflowConfig {
            backend: BackendKind::Memory,
            ..Default::default()
        };
        config.aws.region = String::new();
        assert!(config.validate().is_ok());

        config.backend = BackendKind::Aws;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_queue_name(), "fila-pedidos");
        assert_eq!(default_bucket(), "pedidos-processados");
        assert_eq!(default_table(), "pedidos");
        assert_eq!(default_log_group(), "pedidos-logs");
        assert_eq!(default_log_stream(), "stream1");
        assert_eq!(default_topic(), "pedidos-concluidos");
        assert_eq!(default_product(), "Camiseta");
        assert_eq!(default_quantity(), 2);
        assert_eq!(default_poll_interval_ms(), 1_000);
    }
}
