// Orderflow - Queue-driven order pipeline
// Copyright (c) 2025 Orderflow Contributors
// Licensed under the MIT License

//! # Orderflow - Queue-driven order pipeline
//!
//! Orderflow moves orders from a message queue into four sinks: a blob store,
//! a table store, a log stream and a notification topic. It targets AWS
//! (SQS, S3, DynamoDB, CloudWatch Logs, SNS) or a LocalStack endpoint, and
//! ships an in-memory backend for tests and demos.
//!
//! ## Overview
//!
//! - **Producing** orders `{PedidoId, Produto, Quantidade}` onto the queue
//! - **Consuming** them one at a time, writing every sink before the message
//!   is deleted, so a failed write leaves the message for redelivery
//! - **Retrying** transient sink failures with exponential backoff
//! - **Dead-lettering** malformed or repeatedly failing messages
//! - **Stopping** gracefully between messages on SIGINT/SIGTERM
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Producer and consumer pipeline
//! - [`adapters`] - Queue and sink implementations (AWS, in-memory)
//! - [`domain`] - Order model, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use orderflow::adapters::build_backend;
//! use orderflow::config::load_default_config;
//! use orderflow::core::pipeline::OrderConsumer;
//! use orderflow::core::producer::OrderProducer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // LocalStack defaults
//!     let config = load_default_config()?;
//!     let backend = build_backend(&config).await?;
//!     backend.provision().await?;
//!
//!     let sent = OrderProducer::new(backend.queue.clone(), config.producer.clone())
//!         .send_order()
//!         .await?;
//!     println!("Sent {}", sent.order.order_id);
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let summary = OrderConsumer::from_config(&backend, &config, shutdown_rx)
//!         .with_max_messages(1)
//!         .run()
//!         .await?;
//!
//!     println!("Processed {} order(s)", summary.processed);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library functions return [`domain::Result`], whose error type is
//! [`domain::OrderflowError`]:
//!
//! ```rust
//! use orderflow::domain::{Order, OrderflowError};
//!
//! let err = Order::from_json("not json").unwrap_err();
//! assert!(matches!(err, OrderflowError::InvalidOrder(_)));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
