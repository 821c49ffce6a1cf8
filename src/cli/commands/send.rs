//! Send command implementation
//!
//! This module implements the `send` command, the producer side of the
//! pipeline.

use super::{connect, exit_code_for, load, EXIT_CONFIG, EXIT_SUCCESS};
use crate::core::producer::OrderProducer;
use clap::Args;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Override the product name
    #[arg(long)]
    pub product: Option<String>,

    /// Override the quantity
    #[arg(long, allow_negative_numbers = true)]
    pub quantity: Option<i64>,

    /// Number of orders to send
    #[arg(long, default_value_t = 1)]
    pub count: usize,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(count = self.count, "Starting send command");

        let mut config = match load(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        if let Some(ref product) = self.product {
            config.producer.product = product.clone();
        }
        if let Some(quantity) = self.quantity {
            config.producer.quantity = quantity;
        }
        if let Err(e) = config.validate() {
            println!("❌ Invalid producer settings");
            println!("   Error: {e}");
            return Ok(EXIT_CONFIG);
        }

        let backend = match connect(&config).await {
            Ok(b) => b,
            Err(code) => return Ok(code),
        };

        let producer = OrderProducer::new(backend.queue.clone(), config.producer.clone());
        match producer.send_orders(self.count).await {
            Ok(sent) => {
                for order in &sent {
                    println!(
                        "📤 Pedido enviado: {} ({} x {})",
                        order.order.order_id, order.order.quantity, order.order.product
                    );
                }
                println!("✅ Sent {} order(s) to {}", sent.len(), config.queue.name);
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "Send failed");
                println!("❌ Failed to send order");
                println!("   Error: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_args_defaults() {
        let args = SendArgs {
            product: None,
            quantity: None,
            count: 1,
        };

        assert!(args.product.is_none());
        assert!(args.quantity.is_none());
        assert_eq!(args.count, 1);
    }
}
