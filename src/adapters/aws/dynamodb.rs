//! DynamoDB table store adapter
//!
//! Orders are stored one item per order, hash-keyed on `PedidoId`:
//!
//! | Attribute    | Type |
//! |--------------|------|
//! | `PedidoId`   | S    |
//! | `Produto`    | S    |
//! | `Quantidade` | N    |
//! | `Concluido`  | BOOL |
//!
//! `Concluido` is set once every sink write for the order succeeded.

use super::{describe, sink_error};
use crate::adapters::services::traits::TableStore;
use crate::domain::{Order, OrderId, Result, SinkError};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType,
};
use std::collections::HashMap;

const SINK: &str = "DynamoDB";

const KEY_ATTRIBUTE: &str = "PedidoId";
const PRODUCT_ATTRIBUTE: &str = "Produto";
const QUANTITY_ATTRIBUTE: &str = "Quantidade";
const PROCESSED_ATTRIBUTE: &str = "Concluido";

/// DynamoDB-backed table store
pub struct DynamoTableStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoTableStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    async fn create_table(&self) -> Result<()> {
        let provision_failed = |message: String| SinkError::ProvisionFailed {
            sink: SINK.to_string(),
            message,
        };

        let key_definition = AttributeDefinition::builder()
            .attribute_name(KEY_ATTRIBUTE)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| provision_failed(e.to_string()))?;
        let key_schema = KeySchemaElement::builder()
            .attribute_name(KEY_ATTRIBUTE)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| provision_failed(e.to_string()))?;

        match self
            .client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(key_definition)
            .key_schema(key_schema)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(table = %self.table, "Table created");
                Ok(())
            }
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_in_use_exception()) =>
            {
                Ok(())
            }
            Err(e) => Err(provision_failed(describe(&e)).into()),
        }
    }
}

/// Converts an order to its item attributes
fn order_item(order: &Order) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            KEY_ATTRIBUTE.to_string(),
            AttributeValue::S(order.order_id.to_string()),
        ),
        (
            PRODUCT_ATTRIBUTE.to_string(),
            AttributeValue::S(order.product.clone()),
        ),
        (
            QUANTITY_ATTRIBUTE.to_string(),
            AttributeValue::N(order.quantity.to_string()),
        ),
    ])
}

fn is_marked_processed(item: &HashMap<String, AttributeValue>) -> bool {
    matches!(item.get(PROCESSED_ATTRIBUTE), Some(AttributeValue::Bool(true)))
}

#[async_trait]
impl TableStore for DynamoTableStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn ensure_exists(&self) -> Result<()> {
        match self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(table = %self.table, "Table already exists");
                Ok(())
            }
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception()) =>
            {
                self.create_table().await
            }
            Err(e) => Err(sink_error(SINK, e).into()),
        }
    }

    async fn put_item(&self, order: &Order) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(order_item(order)))
            .send()
            .await
            .map_err(|e| sink_error(SINK, e))?;
        Ok(())
    }

    async fn is_processed(&self, order_id: &OrderId) -> Result<bool> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(order_id.to_string()))
            .projection_expression(PROCESSED_ATTRIBUTE)
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| sink_error(SINK, e))?;

        Ok(output.item().is_some_and(is_marked_processed))
    }

    async fn mark_processed(&self, order_id: &OrderId) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(order_id.to_string()))
            .update_expression("SET #done = :done")
            .expression_attribute_names("#done", PROCESSED_ATTRIBUTE)
            .expression_attribute_values(":done", AttributeValue::Bool(true))
            .send()
            .await
            .map_err(|e| sink_error(SINK, e))?;
        Ok(())
    }
}
