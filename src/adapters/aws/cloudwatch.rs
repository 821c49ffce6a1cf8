//! CloudWatch Logs sink adapter

use super::{describe, sink_error};
use crate::adapters::services::traits::LogSink;
use crate::domain::{Result, SinkError};
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;

const SINK: &str = "CloudWatch Logs";

/// CloudWatch Logs-backed log sink writing to one group/stream pair
pub struct CloudWatchLogSink {
    client: aws_sdk_cloudwatchlogs::Client,
    group: String,
    stream: String,
}

impl CloudWatchLogSink {
    pub fn new(
        client: aws_sdk_cloudwatchlogs::Client,
        group: impl Into<String>,
        stream: impl Into<String>,
    ) -> Self {
        Self {
            client,
            group: group.into(),
            stream: stream.into(),
        }
    }

    fn provision_failed(message: String) -> SinkError {
        SinkError::ProvisionFailed {
            sink: SINK.to_string(),
            message,
        }
    }
}

#[async_trait]
impl LogSink for CloudWatchLogSink {
    fn destination(&self) -> String {
        format!("{}/{}", self.group, self.stream)
    }

    async fn ensure_exists(&self) -> Result<()> {
        match self
            .client
            .create_log_group()
            .log_group_name(&self.group)
            .send()
            .await
        {
            Ok(_) => tracing::info!(group = %self.group, "Log group created"),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_already_exists_exception()) => {}
            Err(e) => return Err(Self::provision_failed(describe(&e)).into()),
        }

        match self
            .client
            .create_log_stream()
            .log_group_name(&self.group)
            .log_stream_name(&self.stream)
            .send()
            .await
        {
            Ok(_) => tracing::info!(group = %self.group, stream = %self.stream, "Log stream created"),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_resource_already_exists_exception()) => {}
            Err(e) => return Err(Self::provision_failed(describe(&e)).into()),
        }

        Ok(())
    }

    async fn put_log_event(&self, timestamp_ms: i64, message: &str) -> Result<()> {
        let event = InputLogEvent::builder()
            .timestamp(timestamp_ms)
            .message(message)
            .build()
            .map_err(|e| SinkError::Rejected {
                sink: SINK.to_string(),
                message: e.to_string(),
            })?;

        self.client
            .put_log_events()
            .log_group_name(&self.group)
            .log_stream_name(&self.stream)
            .log_events(event)
            .send()
            .await
            .map_err(|e| sink_error(SINK, e))?;
        Ok(())
    }
}
