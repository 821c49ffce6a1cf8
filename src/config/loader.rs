//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackendKind, OrderflowConfig};
use super::secret::secret_string;
use crate::domain::errors::OrderflowError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into OrderflowConfig
/// 4. Applies environment variable overrides (ORDERFLOW_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing or substitution
/// fails, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use orderflow::config::loader::load_config;
///
/// let config = load_config("orderflow.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<OrderflowConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(OrderflowError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        OrderflowError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: OrderflowConfig = toml::from_str(&contents)
        .map_err(|e| OrderflowError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        OrderflowError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Builds the configuration from built-in defaults plus environment overrides
///
/// Used when no configuration file is given; the defaults target LocalStack
/// with the stock resource names.
pub fn load_default_config() -> Result<OrderflowConfig> {
    let mut config = OrderflowConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        OrderflowError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Loads `path` when given, otherwise the defaults
pub fn load_config_or_default(path: Option<&str>) -> Result<OrderflowConfig> {
    match path {
        Some(path) => load_config(path),
        None => load_default_config(),
    }
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| OrderflowError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        // Comments keep their placeholders untouched
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(OrderflowError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using ORDERFLOW_* prefix
///
/// Environment variables follow the pattern: ORDERFLOW_<SECTION>_<KEY>
/// For example: ORDERFLOW_QUEUE_NAME, ORDERFLOW_AWS_ENDPOINT_URL
fn apply_env_overrides(config: &mut OrderflowConfig) -> Result<()> {
    if let Ok(val) = std::env::var("ORDERFLOW_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_BACKEND") {
        config.backend = match val.to_lowercase().as_str() {
            "aws" => BackendKind::Aws,
            "memory" => BackendKind::Memory,
            other => {
                return Err(OrderflowError::Configuration(format!(
                    "Invalid ORDERFLOW_BACKEND '{other}'. Must be one of: aws, memory"
                )))
            }
        };
    }

    // AWS overrides; an empty endpoint means "use the real AWS endpoints"
    if let Ok(val) = std::env::var("ORDERFLOW_AWS_ENDPOINT_URL") {
        config.aws.endpoint_url = if val.is_empty() { None } else { Some(val) };
    }
    if let Ok(val) = std::env::var("ORDERFLOW_AWS_REGION") {
        config.aws.region = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_AWS_ACCESS_KEY_ID") {
        config.aws.access_key_id = Some(val);
    }
    if let Ok(val) = std::env::var("ORDERFLOW_AWS_SECRET_ACCESS_KEY") {
        config.aws.secret_access_key = Some(secret_string(val));
    }

    // Queue overrides
    if let Ok(val) = std::env::var("ORDERFLOW_QUEUE_NAME") {
        config.queue.name = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_QUEUE_DEAD_LETTER_QUEUE") {
        config.queue.dead_letter_queue = if val.is_empty() { None } else { Some(val) };
    }
    if let Ok(val) = std::env::var("ORDERFLOW_QUEUE_MAX_RECEIVE_COUNT") {
        if let Ok(count) = val.parse() {
            config.queue.max_receive_count = count;
        }
    }

    // Sink overrides
    if let Ok(val) = std::env::var("ORDERFLOW_STORAGE_BUCKET") {
        config.storage.bucket = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_STORAGE_TABLE") {
        config.storage.table = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_LOG_SINK_GROUP") {
        config.log_sink.group = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_LOG_SINK_STREAM") {
        config.log_sink.stream = val;
    }
    if let Ok(val) = std::env::var("ORDERFLOW_NOTIFICATION_TOPIC") {
        config.notification.topic = val;
    }

    // Consumer overrides
    if let Ok(val) = std::env::var("ORDERFLOW_CONSUMER_POLL_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.consumer.poll_interval_ms = interval;
        }
    }
    if let Ok(val) = std::env::var("ORDERFLOW_CONSUMER_SKIP_DUPLICATES") {
        config.consumer.skip_duplicates = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ORDERFLOW_CONSUMER_RETRY_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.consumer.retry.max_retries = retries;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("ORDERFLOW_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("ORDERFLOW_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("ORDERFLOW_LOADER_TEST_VAR", "test_value");
        let input = "secret_access_key = \"${ORDERFLOW_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "secret_access_key = \"test_value\"\n");
        std::env::remove_var("ORDERFLOW_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("ORDERFLOW_LOADER_MISSING_VAR");
        let input = "secret_access_key = \"${ORDERFLOW_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("ORDERFLOW_LOADER_COMMENTED_VAR");
        let input = "# key = \"${ORDERFLOW_LOADER_COMMENTED_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${ORDERFLOW_LOADER_COMMENTED_VAR}"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
backend = "memory"

[application]
log_level = "debug"

[queue]
name = "orders"
dead_letter_queue = "orders-dlq"

[storage]
bucket = "orders-processed"
table = "orders"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.queue.name, "orders");
        assert_eq!(config.queue.dead_letter_queue.as_deref(), Some("orders-dlq"));
        assert_eq!(config.storage.bucket, "orders-processed");
        // Sections left out keep their defaults
        assert_eq!(config.log_sink.group, "pedidos-logs");
        assert_eq!(config.notification.topic, "pedidos-concluidos");
    }

    #[test]
    fn test_load_config_or_default_without_path() {
        let config = load_config_or_default(None).unwrap();
        assert!(!config.queue.name.is_empty());
    }
}
