//! Domain identifier types with validation
//!
//! Newtype wrappers for identifiers flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix used for generated order identifiers
pub const ORDER_ID_PREFIX: &str = "pedido";

/// Order identifier newtype wrapper
///
/// Generated ids are derived from the current time: `pedido-<unix-seconds>`.
/// Any non-empty string is accepted when an id arrives on the wire.
///
/// # Examples
///
/// ```
/// use orderflow::domain::ids::OrderId;
/// use std::str::FromStr;
///
/// let id = OrderId::from_str("pedido-1700000000").unwrap();
/// assert_eq!(id.as_str(), "pedido-1700000000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    /// Creates a new OrderId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(OrderId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Order ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Builds the id for an order created at `timestamp`
    pub fn from_timestamp(timestamp: DateTime<Utc>) -> Self {
        Self(format!("{ORDER_ID_PREFIX}-{}", timestamp.timestamp()))
    }

    /// Builds a sequence-suffixed id, for several orders created in the same second
    pub fn from_timestamp_seq(timestamp: DateTime<Utc>, seq: usize) -> Self {
        Self(format!("{ORDER_ID_PREFIX}-{}-{seq}", timestamp.timestamp()))
    }

    /// Returns the order ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OrderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_order_id_valid() {
        let id = OrderId::new("pedido-1").unwrap();
        assert_eq!(id.as_str(), "pedido-1");
        assert_eq!(id.to_string(), "pedido-1");
        assert_eq!(id.into_inner(), "pedido-1");
    }

    #[test]
    fn test_order_id_empty() {
        assert!(OrderId::new("").is_err());
        assert!(OrderId::new("   ").is_err());
    }

    #[test]
    fn test_order_id_from_timestamp() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(OrderId::from_timestamp(ts).as_str(), "pedido-1700000000");
        assert_eq!(
            OrderId::from_timestamp_seq(ts, 3).as_str(),
            "pedido-1700000000-3"
        );
    }

    #[test]
    fn test_order_id_serde_rejects_empty() {
        let ok: OrderId = serde_json::from_str("\"pedido-9\"").unwrap();
        assert_eq!(ok.as_str(), "pedido-9");
        assert!(serde_json::from_str::<OrderId>("\"\"").is_err());
    }
}
