//! External system integrations for Orderflow.
//!
//! This module provides adapters for the services the pipeline talks to:
//!
//! - [`services`] - Queue and sink traits plus the backend factory
//! - [`aws`] - SQS, S3, DynamoDB, CloudWatch Logs and SNS implementations
//! - [`memory`] - In-process implementations for rehearsal and tests
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies.
//! The pipeline depends only on the traits in [`services`], so the same code
//! drives AWS (or LocalStack) and the in-memory backend.
//!
//! ```rust
//! use orderflow::adapters::{build_backend, MessageQueue};
//! use orderflow::config::{BackendKind, OrderflowConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrderflowConfig {
//!     backend: BackendKind::Memory,
//!     ..Default::default()
//! };
//!
//! let backend = build_backend(&config).await?;
//! backend.queue.send(r#"{"PedidoId":"pedido-1","Produto":"Camiseta","Quantidade":2}"#).await?;
//! # Ok(())
//! # }
//! ```

pub mod aws;
pub mod memory;
pub mod services;

pub use services::{
    build_backend, Backend, BlobStore, LogSink, MemoryBackend, MessageQueue, Notifier,
    QueueMessage, Sinks, TableStore,
};
