//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals are properly handled
//! - The consumer stops between messages, never in the middle of one
//! - Unprocessed messages stay in the queue for the next run

use orderflow::adapters::{MemoryBackend, MessageQueue};
use orderflow::config::OrderflowConfig;
use orderflow::core::pipeline::OrderConsumer;
use std::time::Duration;
use tokio::sync::watch;

const ORDER_BODY: &str = r#"{"PedidoId":"pedido-1700000000","Produto":"Camiseta","Quantidade":2}"#;

fn test_config(poll_interval_ms: u64) -> OrderflowConfig {
    let mut config = OrderflowConfig::default();
    config.consumer.poll_interval_ms = poll_interval_ms;
    config.consumer.retry.max_retries = 0;
    config
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_consumer_stops_while_sleeping() {
    // Long poll interval: the consumer sits in its sleep when the signal arrives
    let config = test_config(60_000);
    let memory = MemoryBackend::from_config(&config);
    memory.queue.send(ORDER_BODY).await.unwrap();
    memory.queue.send(ORDER_BODY).await.unwrap();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = OrderConsumer::from_config(&memory.backend(), &config, shutdown_rx);
    let handle = tokio::spawn(async move { consumer.run().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("consumer did not stop")
        .unwrap()
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.processed, 1);
    assert_eq!(memory.queue.len(), 1);
    assert_eq!(memory.notifier.published().len(), 1);
}

#[tokio::test]
async fn test_consumer_stops_while_waiting_for_messages() {
    // Long-poll receive on an empty queue
    let mut config = test_config(0);
    config.queue.wait_time_seconds = 20;
    let memory = MemoryBackend::from_config(&config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = OrderConsumer::from_config(&memory.backend(), &config, shutdown_rx);
    let handle = tokio::spawn(async move { consumer.run().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(true).unwrap();

    let summary = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("consumer did not stop")
        .unwrap()
        .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.received, 0);
}

#[tokio::test]
async fn test_consumer_keeps_running_when_sender_is_dropped() {
    let mut config = test_config(0);
    config.consumer.max_messages = 1;
    let memory = MemoryBackend::from_config(&config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    drop(shutdown_tx);
    let consumer = OrderConsumer::from_config(&memory.backend(), &config, shutdown_rx);

    memory.queue.send(ORDER_BODY).await.unwrap();
    let summary = consumer.run().await.unwrap();

    assert!(!summary.interrupted);
    assert_eq!(summary.processed, 1);
}
