//! SQS queue adapter

use super::{describe, queue_error};
use crate::adapters::services::traits::{MessageQueue, QueueMessage};
use crate::domain::{OrderflowError, QueueError, Result};
use async_trait::async_trait;
use aws_sdk_sqs::error::ProvideErrorMetadata;
use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Longest long-poll SQS accepts
const MAX_WAIT_SECONDS: u64 = 20;

/// SQS-backed message queue
///
/// The queue URL is looked up on first use and cached.
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
    name: String,
    visibility_timeout_seconds: Option<u32>,
    url: OnceCell<String>,
}

impl SqsQueue {
    pub fn new(
        client: aws_sdk_sqs::Client,
        name: impl Into<String>,
        visibility_timeout_seconds: Option<u32>,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            visibility_timeout_seconds,
            url: OnceCell::new(),
        }
    }

    async fn queue_url(&self) -> Result<&str> {
        let url = self
            .url
            .get_or_try_init(|| async {
                let output = self
                    .client
                    .get_queue_url()
                    .queue_name(&self.name)
                    .send()
                    .await
                    .map_err(|e| queue_error(e, QueueError::QueueNotFound))?;

                let url = output
                    .queue_url()
                    .ok_or_else(|| QueueError::QueueNotFound(self.name.clone()))?;
                Ok::<_, OrderflowError>(url.to_string())
            })
            .await?;
        Ok(url.as_str())
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ensure_exists(&self) -> Result<()> {
        let output = self
            .client
            .create_queue()
            .queue_name(&self.name)
            .send()
            .await
            .map_err(|e| queue_error(e, QueueError::CreationFailed))?;

        if let Some(url) = output.queue_url() {
            // Already set when the URL was resolved earlier; same value either way
            let _ = self.url.set(url.to_string());
        }

        tracing::info!(queue = %self.name, "Queue ready");
        Ok(())
    }

    async fn send(&self, body: &str) -> Result<String> {
        let url = self.queue_url().await?;
        let output = self
            .client
            .send_message()
            .queue_url(url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| queue_error(e, QueueError::SendFailed))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }

    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>> {
        let url = self.queue_url().await?;
        let wait_seconds = wait.as_secs().min(MAX_WAIT_SECONDS) as i32;

        let mut request = self
            .client
            .receive_message()
            .queue_url(url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount);
        if let Some(timeout) = self.visibility_timeout_seconds {
            request = request.visibility_timeout(timeout as i32);
        }

        let output = request
            .send()
            .await
            .map_err(|e| queue_error(e, QueueError::ReceiveFailed))?;

        let Some(message) = output.messages().first() else {
            return Ok(None);
        };

        let receipt_handle = message.receipt_handle().ok_or_else(|| {
            QueueError::ReceiveFailed(format!("Message from {} has no receipt handle", self.name))
        })?;

        let receive_count = message
            .attributes()
            .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
            .and_then(|count| count.parse().ok())
            .unwrap_or(1);

        Ok(Some(QueueMessage {
            message_id: message.message_id().unwrap_or_default().to_string(),
            receipt_handle: receipt_handle.to_string(),
            body: message.body().unwrap_or_default().to_string(),
            receive_count,
        }))
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        let url = self.queue_url().await?;
        self.client
            .delete_message()
            .queue_url(url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| {
                if e.code().is_some_and(|code| code.contains("ReceiptHandleIsInvalid")) {
                    QueueError::InvalidReceiptHandle(describe(&e))
                } else {
                    queue_error(e, QueueError::DeleteFailed)
                }
            })?;
        Ok(())
    }

    async fn approximate_len(&self) -> Result<u64> {
        let url = self.queue_url().await?;
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(url)
            .attribute_names(QueueAttributeName::ApproximateNumberOfMessages)
            .send()
            .await
            .map_err(|e| queue_error(e, QueueError::ReceiveFailed))?;

        Ok(output
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::ApproximateNumberOfMessages))
            .and_then(|count| count.parse().ok())
            .unwrap_or(0))
    }
}
