//! Domain models and types for Orderflow.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`OrderId`])
//! - **Domain models** ([`Order`])
//! - **Error types** ([`OrderflowError`], [`QueueError`], [`SinkError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use orderflow::domain::Order;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let order = Order::from_json(
//!     r#"{"PedidoId":"pedido-1700000000","Produto":"Camiseta","Quantidade":2}"#,
//! )?;
//! assert_eq!(order.blob_key(), "pedido-1700000000.json");
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod ids;
pub mod order;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{OrderflowError, QueueError, SinkError};
pub use ids::OrderId;
pub use order::{Order, ORDER_CONTENT_TYPE};
pub use result::Result;
