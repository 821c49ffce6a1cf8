//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use orderflow::config::{load_config, load_config_or_default, BackendKind, OrderflowConfig};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    guard
}

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("ORDERFLOW_APPLICATION_LOG_LEVEL");
    std::env::remove_var("ORDERFLOW_BACKEND");
    std::env::remove_var("ORDERFLOW_QUEUE_NAME");
    std::env::remove_var("ORDERFLOW_STORAGE_BUCKET");
    std::env::remove_var("ORDERFLOW_CONSUMER_POLL_INTERVAL_MS");
    std::env::remove_var("ORDERFLOW_CONSUMER_SKIP_DUPLICATES");
    std::env::remove_var("TEST_ORDERFLOW_SECRET");
}

fn secret_key(config: &OrderflowConfig) -> Option<String> {
    let secret: &str = config.aws.secret_access_key.as_ref()?.expose_secret().as_ref();
    Some(secret.to_string())
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _guard = lock_env();
    let file = write_config(
        r#"
backend = "aws"

[application]
log_level = "debug"

[aws]
endpoint_url = "http://localstack:4566"
region = "sa-east-1"
access_key_id = "AKIATEST"
secret_access_key = "secret-123"

[queue]
name = "orders"
dead_letter_queue = "orders-dlq"
max_receive_count = 3
wait_time_seconds = 10
visibility_timeout_seconds = 60

[storage]
bucket = "orders-archive"
table = "orders"

[log_sink]
group = "orders-logs"
stream = "worker-1"

[notification]
topic = "orders-done"

[producer]
product = "Caneca"
quantity = 7

[consumer]
poll_interval_ms = 250
max_messages = 100
skip_duplicates = true
max_consecutive_receive_errors = 10

[consumer.retry]
max_retries = 5
initial_delay_ms = 50
max_delay_ms = 1000
backoff_multiplier = 3.0
jitter = false

[logging]
local_enabled = false
local_rotation = "hourly"
json_console = true
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.backend, BackendKind::Aws);
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localstack:4566"));
    assert_eq!(config.aws.region, "sa-east-1");
    assert!(config.aws.has_static_credentials());
    assert_eq!(secret_key(&config).as_deref(), Some("secret-123"));
    assert_eq!(config.queue.name, "orders");
    assert_eq!(config.queue.dead_letter_queue.as_deref(), Some("orders-dlq"));
    assert_eq!(config.queue.max_receive_count, 3);
    assert_eq!(config.queue.wait_time_seconds, 10);
    assert_eq!(config.queue.visibility_timeout_seconds, Some(60));
    assert_eq!(config.storage.bucket, "orders-archive");
    assert_eq!(config.log_sink.stream, "worker-1");
    assert_eq!(config.notification.topic, "orders-done");
    assert_eq!(config.producer.product, "Caneca");
    assert_eq!(config.producer.quantity, 7);
    assert_eq!(config.consumer.poll_interval_ms, 250);
    assert!(config.consumer.skip_duplicates);
    assert_eq!(config.consumer.retry.max_retries, 5);
    assert!(!config.consumer.retry.jitter);
    assert_eq!(config.logging.local_rotation, "hourly");
    assert!(config.logging.json_console);
}

#[test]
fn test_defaults_match_localstack_setup() {
    let _guard = lock_env();
    let config = load_config_or_default(None).unwrap();

    assert_eq!(config.backend, BackendKind::Aws);
    assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
    assert_eq!(config.aws.region, "us-east-1");
    assert_eq!(config.queue.name, "fila-pedidos");
    assert_eq!(config.storage.bucket, "pedidos-processados");
    assert_eq!(config.storage.table, "pedidos");
    assert_eq!(config.log_sink.group, "pedidos-logs");
    assert_eq!(config.log_sink.stream, "stream1");
    assert_eq!(config.notification.topic, "pedidos-concluidos");
    assert_eq!(config.producer.product, "Camiseta");
    assert_eq!(config.producer.quantity, 2);
    assert_eq!(config.consumer.poll_interval_ms, 1000);
}

#[test]
fn test_env_var_substitution() {
    let _guard = lock_env();
    std::env::set_var("TEST_ORDERFLOW_SECRET", "from-env");
    let file = write_config(
        r#"
[aws]
access_key_id = "test"
secret_access_key = "${TEST_ORDERFLOW_SECRET}"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(secret_key(&config).as_deref(), Some("from-env"));
    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_an_error() {
    let _guard = lock_env();
    let file = write_config(
        r#"
[aws]
secret_access_key = "${TEST_ORDERFLOW_SECRET}"
"#,
    );

    let result = load_config(file.path());
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("TEST_ORDERFLOW_SECRET"));
}

#[test]
fn test_env_overrides() {
    let _guard = lock_env();
    std::env::set_var("ORDERFLOW_BACKEND", "memory");
    std::env::set_var("ORDERFLOW_QUEUE_NAME", "override-queue");
    std::env::set_var("ORDERFLOW_CONSUMER_POLL_INTERVAL_MS", "10");
    std::env::set_var("ORDERFLOW_CONSUMER_SKIP_DUPLICATES", "true");

    let file = write_config(
        r#"
[queue]
name = "file-queue"
"#,
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.backend, BackendKind::Memory);
    assert_eq!(config.queue.name, "override-queue");
    assert_eq!(config.consumer.poll_interval_ms, 10);
    assert!(config.consumer.skip_duplicates);
    cleanup_env_vars();
}

#[test]
fn test_invalid_backend_override() {
    let _guard = lock_env();
    std::env::set_var("ORDERFLOW_BACKEND", "kafka");

    let result = load_config_or_default(None);
    assert!(result.is_err());
    cleanup_env_vars();
}

#[test]
fn test_validation_rejects_bad_values() {
    let _guard = lock_env();
    let cases = [
        "[application]\nlog_level = \"loud\"\n",
        "[queue]\nname = \"\"\n",
        "[queue]\nname = \"bad name!\"\n",
        "[queue]\nname = \"fila\"\ndead_letter_queue = \"fila\"\n",
        "[queue]\nwait_time_seconds = 30\n",
        "[consumer.retry]\nbackoff_multiplier = 0.5\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ];

    for case in cases {
        let file = write_config(case);
        assert!(
            load_config(file.path()).is_err(),
            "expected validation error for: {case}"
        );
    }
}

#[test]
fn test_invalid_toml() {
    let _guard = lock_env();
    let file = write_config("backend = \n");
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse TOML"));
}

#[test]
fn test_missing_file() {
    let _guard = lock_env();
    let err = load_config("/nonexistent/orderflow.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
