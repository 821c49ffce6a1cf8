//! SNS notification adapter

use super::sink_error;
use crate::adapters::services::traits::Notifier;
use crate::domain::{OrderflowError, Result, SinkError};
use async_trait::async_trait;
use tokio::sync::OnceCell;

const SINK: &str = "SNS";

/// SNS-backed notifier
///
/// The topic ARN is obtained with `CreateTopic`, which returns the existing
/// topic when one with the same name is already there, and then cached.
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    topic: String,
    arn: OnceCell<String>,
}

impl SnsNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
            arn: OnceCell::new(),
        }
    }

    async fn topic_arn(&self) -> Result<&str> {
        let arn = self
            .arn
            .get_or_try_init(|| async {
                let output = self
                    .client
                    .create_topic()
                    .name(&self.topic)
                    .send()
                    .await
                    .map_err(|e| sink_error(SINK, e))?;

                let arn = output.topic_arn().ok_or_else(|| SinkError::ResourceNotFound {
                    sink: SINK.to_string(),
                    message: format!("No ARN returned for topic {}", self.topic),
                })?;
                tracing::debug!(topic = %self.topic, arn = %arn, "Resolved topic ARN");
                Ok::<_, OrderflowError>(arn.to_string())
            })
            .await?;
        Ok(arn.as_str())
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn ensure_exists(&self) -> Result<()> {
        self.topic_arn().await?;
        tracing::info!(topic = %self.topic, "Topic ready");
        Ok(())
    }

    async fn publish(&self, message: &str) -> Result<String> {
        let arn = self.topic_arn().await?;
        let output = self
            .client
            .publish()
            .topic_arn(arn)
            .message(message)
            .send()
            .await
            .map_err(|e| sink_error(SINK, e))?;

        Ok(output.message_id().unwrap_or_default().to_string())
    }
}
