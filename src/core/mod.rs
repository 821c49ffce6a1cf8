//! Core business logic for Orderflow.
//!
//! # Modules
//!
//! - [`producer`] - Builds orders and enqueues them
//! - [`pipeline`] - Consumes orders and fans them out to the sinks
//!
//! # Pipeline Workflow
//!
//! For every message, one at a time:
//!
//! 1. **Receive**: Take at most one message from the source queue
//! 2. **Parse**: Decode the order; malformed bodies go to the dead-letter queue if there is one
//! 3. **Blob store**: Write `<order_id>.json`
//! 4. **Table store**: Write the order item
//! 5. **Log sink**: Append `Processado: <order_id>`
//! 6. **Notify**: Publish `Pedido <order_id> concluído!`
//! 7. **Delete**: Acknowledge the message, only after all four writes succeeded
//! 8. **Sleep**: Wait the poll interval, or stop on shutdown
//!
//! # Example
//!
//! ```rust
//! use orderflow::adapters::build_backend;
//! use orderflow::config::{BackendKind, OrderflowConfig};
//! use orderflow::core::pipeline::OrderConsumer;
//! use orderflow::core::producer::OrderProducer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = OrderflowConfig {
//!     backend: BackendKind::Memory,
//!     ..Default::default()
//! };
//! config.consumer.max_messages = 1;
//!
//! let backend = build_backend(&config).await?;
//! OrderProducer::new(backend.queue.clone(), config.producer.clone())
//!     .send_order()
//!     .await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let summary = OrderConsumer::from_config(&backend, &config, shutdown_rx)
//!     .run()
//!     .await?;
//!
//! println!("Processed: {}", summary.processed);
//! # Ok(())
//! # }
//! ```

pub mod pipeline;
pub mod producer;
