//! Order domain model
//!
//! The single record that flows through the pipeline. On the wire an order is
//! a JSON object `{"PedidoId": string, "Produto": string, "Quantidade": integer}`.

use super::errors::OrderflowError;
use super::ids::OrderId;
use super::result::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content type of serialized orders
pub const ORDER_CONTENT_TYPE: &str = "application/json";

/// An order as carried by queue messages and written to every sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier
    #[serde(rename = "PedidoId")]
    pub order_id: OrderId,

    /// Product name
    #[serde(rename = "Produto")]
    pub product: String,

    /// Quantity ordered
    #[serde(rename = "Quantidade")]
    pub quantity: i64,
}

impl Order {
    /// Creates a new order
    pub fn new(order_id: OrderId, product: impl Into<String>, quantity: i64) -> Self {
        Self {
            order_id,
            product: product.into(),
            quantity,
        }
    }

    /// Creates an order whose id is derived from `now`
    pub fn created_at(now: DateTime<Utc>, product: impl Into<String>, quantity: i64) -> Self {
        Self::new(OrderId::from_timestamp(now), product, quantity)
    }

    /// Serializes the order to its wire format
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses an order from a message body
    ///
    /// # Errors
    ///
    /// Returns [`OrderflowError::InvalidOrder`] when the body is not valid JSON,
    /// a field is missing or mistyped, or the order id is empty.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| OrderflowError::InvalidOrder(e.to_string()))
    }

    /// Object key in the blob store
    pub fn blob_key(&self) -> String {
        format!("{}.json", self.order_id)
    }

    /// Line appended to the log sink once the order is processed
    pub fn log_line(&self) -> String {
        format!("Processado: {}", self.order_id)
    }

    /// Text published to the notification topic
    pub fn notification_text(&self) -> String {
        format!("Pedido {} concluído!", self.order_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn sample() -> Order {
        Order::new(
            OrderId::from_str("pedido-1700000000").unwrap(),
            "Camiseta",
            2,
        )
    }

    #[test]
    fn test_order_wire_format() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["PedidoId"], "pedido-1700000000");
        assert_eq!(value["Produto"], "Camiseta");
        assert_eq!(value["Quantidade"], 2);
    }

    #[test]
    fn test_order_from_json() {
        let order = Order::from_json(
            r#"{"PedidoId":"pedido-1700000000","Produto":"Camiseta","Quantidade":2}"#,
        )
        .unwrap();
        assert_eq!(order, sample());
    }

    #[test]
    fn test_order_from_json_rejects_malformed() {
        assert!(Order::from_json("not json").is_err());
        assert!(Order::from_json(r#"{"Produto":"Camiseta","Quantidade":2}"#).is_err());
        assert!(Order::from_json(r#"{"PedidoId":"","Produto":"x","Quantidade":1}"#).is_err());
        assert!(
            Order::from_json(r#"{"PedidoId":"p","Produto":"x","Quantidade":"dois"}"#).is_err()
        );
    }

    #[test]
    fn test_order_from_json_error_kind() {
        let err = Order::from_json("{}").unwrap_err();
        assert!(matches!(err, OrderflowError::InvalidOrder(_)));
    }

    #[test]
    fn test_order_derived_texts() {
        let order = sample();
        assert_eq!(order.blob_key(), "pedido-1700000000.json");
        assert_eq!(order.log_line(), "Processado: pedido-1700000000");
        assert_eq!(
            order.notification_text(),
            "Pedido pedido-1700000000 concluído!"
        );
    }

    #[test]
    fn test_order_created_at() {
        let now = Utc.timestamp_opt(1_700_000_123, 0).unwrap();
        let order = Order::created_at(now, "Camiseta", 2);
        assert_eq!(order.order_id.as_str(), "pedido-1700000123");
    }
}
