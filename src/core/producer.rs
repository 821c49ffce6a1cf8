//! Order producer
//!
//! Builds synthetic orders and enqueues them on the source queue.

use crate::adapters::services::MessageQueue;
use crate::config::ProducerConfig;
use crate::domain::{Order, OrderId, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// An order accepted by the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentOrder {
    pub order: Order,
    pub message_id: String,
}

/// Enqueues orders built from [`ProducerConfig`]
pub struct OrderProducer {
    queue: Arc<dyn MessageQueue>,
    config: ProducerConfig,
}

impl OrderProducer {
    pub fn new(queue: Arc<dyn MessageQueue>, config: ProducerConfig) -> Self {
        Self { queue, config }
    }

    /// Build the order that would be sent at `now`
    pub fn build_order(&self, now: DateTime<Utc>) -> Order {
        Order::created_at(now, &self.config.product, self.config.quantity)
    }

    /// Build and enqueue one order
    ///
    /// # Errors
    ///
    /// Returns an error if the queue rejects the message.
    pub async fn send_order(&self) -> Result<SentOrder> {
        self.submit(self.build_order(Utc::now())).await
    }

    /// Build and enqueue `count` orders
    ///
    /// Ids carry a sequence suffix (`pedido-<secs>-<n>`, starting at 1) when
    /// more than one order is sent, so orders built in the same second stay
    /// distinct. Stops at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue rejects a message.
    pub async fn send_orders(&self, count: usize) -> Result<Vec<SentOrder>> {
        if count <= 1 {
            let mut sent = Vec::with_capacity(count);
            if count == 1 {
                sent.push(self.send_order().await?);
            }
            return Ok(sent);
        }

        let now = Utc::now();
        let mut sent = Vec::with_capacity(count);
        for seq in 1..=count {
            let order = Order::new(
                OrderId::from_timestamp_seq(now, seq),
                &self.config.product,
                self.config.quantity,
            );
            sent.push(self.submit(order).await?);
        }
        Ok(sent)
    }

    async fn submit(&self, order: Order) -> Result<SentOrder> {
        let body = order.to_json()?;
        let message_id = self.queue.send(&body).await?;

        tracing::info!(
            order_id = %order.order_id,
            message_id = %message_id,
            queue = %self.queue.name(),
            "Order sent"
        );

        Ok(SentOrder { order, message_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQueue;
    use chrono::TimeZone;
    use std::time::Duration;

    fn producer() -> (Arc<InMemoryQueue>, OrderProducer) {
        let queue = Arc::new(InMemoryQueue::new("fila-pedidos"));
        let producer = OrderProducer::new(queue.clone(), ProducerConfig::default());
        (queue, producer)
    }

    #[test]
    fn test_build_order_uses_timestamp_and_defaults() {
        let (_queue, producer) = producer();
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

        let order = producer.build_order(now);
        assert_eq!(order.order_id.as_str(), "pedido-1700000000");
        assert_eq!(order.product, "Camiseta");
        assert_eq!(order.quantity, 2);
    }

    #[tokio::test]
    async fn test_send_order_enqueues_valid_order() {
        let (queue, producer) = producer();

        let sent = producer.send_order().await.unwrap();
        assert!(!sent.message_id.is_empty());

        let message = queue.receive(Duration::ZERO).await.unwrap().unwrap();
        let order = Order::from_json(&message.body).unwrap();
        assert!(!order.order_id.as_str().is_empty());
        assert_eq!(order.product, "Camiseta");
        assert_eq!(order.quantity, 2);
        assert_eq!(order, sent.order);
    }

    #[tokio::test]
    async fn test_send_orders_uses_distinct_ids() {
        let (queue, producer) = producer();

        let sent = producer.send_orders(3).await.unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(queue.len(), 3);
        assert!(sent[0].order.order_id.as_str().ends_with("-1"));
        assert!(sent[2].order.order_id.as_str().ends_with("-3"));
        assert_ne!(sent[0].order.order_id, sent[1].order.order_id);
    }

    #[tokio::test]
    async fn test_send_orders_zero_sends_nothing() {
        let (queue, producer) = producer();
        assert!(producer.send_orders(0).await.unwrap().is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_returned() {
        let (queue, producer) = producer();
        queue.faults().fail_next(1);

        assert!(producer.send_order().await.is_err());
        assert!(queue.is_empty());
    }
}
