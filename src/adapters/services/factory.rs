//! Backend factory
//!
//! Builds the queue and sink handles from configuration. The pipeline only
//! ever sees the trait objects, so the AWS and in-memory backends are
//! interchangeable.

use crate::adapters::aws::{
    AwsClients, CloudWatchLogSink, DynamoTableStore, S3BlobStore, SnsNotifier, SqsQueue,
};
use crate::adapters::memory::{
    InMemoryBlobStore, InMemoryLogSink, InMemoryNotifier, InMemoryQueue, InMemoryTableStore,
};
use crate::adapters::services::traits::{BlobStore, LogSink, MessageQueue, Notifier, TableStore};
use crate::config::schema::{BackendKind, OrderflowConfig};
use crate::domain::Result;
use std::sync::Arc;
use std::time::Duration;

/// The four sinks every processed order is written to
#[derive(Clone)]
pub struct Sinks {
    pub blob: Arc<dyn BlobStore>,
    pub table: Arc<dyn TableStore>,
    pub log: Arc<dyn LogSink>,
    pub notifier: Arc<dyn Notifier>,
}

/// Queue and sink handles for one backend
#[derive(Clone)]
pub struct Backend {
    /// Source queue
    pub queue: Arc<dyn MessageQueue>,

    /// Dead-letter queue, when configured
    pub dead_letter_queue: Option<Arc<dyn MessageQueue>>,

    /// Sinks
    pub sinks: Sinks,
}

impl Backend {
    /// Create every queue, bucket, table, log stream and topic that is missing
    ///
    /// # Errors
    ///
    /// Returns the first provisioning failure.
    pub async fn provision(&self) -> Result<()> {
        self.queue.ensure_exists().await?;
        if let Some(ref dlq) = self.dead_letter_queue {
            dlq.ensure_exists().await?;
        }
        self.sinks.blob.ensure_exists().await?;
        self.sinks.table.ensure_exists().await?;
        self.sinks.log.ensure_exists().await?;
        self.sinks.notifier.ensure_exists().await?;

        tracing::info!(
            queue = %self.queue.name(),
            bucket = %self.sinks.blob.bucket(),
            table = %self.sinks.table.table_name(),
            log = %self.sinks.log.destination(),
            topic = %self.sinks.notifier.topic(),
            "Resources provisioned"
        );
        Ok(())
    }
}

/// Build the backend selected by `config.backend`
///
/// # Errors
///
/// Returns an error if the backend cannot be created
pub async fn build_backend(config: &OrderflowConfig) -> Result<Backend> {
    match config.backend {
        BackendKind::Aws => {
            tracing::info!("Creating AWS backend");
            let clients = AwsClients::connect(&config.aws).await;
            Ok(aws_backend(&clients, config))
        }
        BackendKind::Memory => {
            tracing::info!("Creating in-memory backend");
            Ok(MemoryBackend::from_config(config).backend())
        }
    }
}

fn aws_backend(clients: &AwsClients, config: &OrderflowConfig) -> Backend {
    let visibility_timeout = config.queue.visibility_timeout_seconds;

    let queue: Arc<dyn MessageQueue> = Arc::new(SqsQueue::new(
        clients.sqs.clone(),
        &config.queue.name,
        visibility_timeout,
    ));
    let dead_letter_queue = config.queue.dead_letter_queue.as_ref().map(|name| {
        Arc::new(SqsQueue::new(clients.sqs.clone(), name, visibility_timeout))
            as Arc<dyn MessageQueue>
    });

    Backend {
        queue,
        dead_letter_queue,
        sinks: Sinks {
            blob: Arc::new(S3BlobStore::new(
                clients.s3.clone(),
                &config.storage.bucket,
                clients.region(),
            )),
            table: Arc::new(DynamoTableStore::new(
                clients.dynamodb.clone(),
                &config.storage.table,
            )),
            log: Arc::new(CloudWatchLogSink::new(
                clients.logs.clone(),
                &config.log_sink.group,
                &config.log_sink.stream,
            )),
            notifier: Arc::new(SnsNotifier::new(
                clients.sns.clone(),
                &config.notification.topic,
            )),
        },
    }
}

/// In-memory backend with concrete handles
///
/// Keeps the concrete types so callers can inspect what was written, and
/// hands out the same instances as trait objects through [`backend`](Self::backend).
#[derive(Clone)]
pub struct MemoryBackend {
    pub queue: Arc<InMemoryQueue>,
    pub dead_letter_queue: Option<Arc<InMemoryQueue>>,
    pub blob: Arc<InMemoryBlobStore>,
    pub table: Arc<InMemoryTableStore>,
    pub log: Arc<InMemoryLogSink>,
    pub notifier: Arc<InMemoryNotifier>,
}

impl MemoryBackend {
    /// Create empty resources named after the configuration
    pub fn from_config(config: &OrderflowConfig) -> Self {
        let visibility_timeout =
            Duration::from_secs(u64::from(config.queue.visibility_timeout_seconds.unwrap_or(0)));

        Self {
            queue: Arc::new(InMemoryQueue::with_visibility_timeout(
                &config.queue.name,
                visibility_timeout,
            )),
            dead_letter_queue: config
                .queue
                .dead_letter_queue
                .as_ref()
                .map(|name| Arc::new(InMemoryQueue::with_visibility_timeout(name, visibility_timeout))),
            blob: Arc::new(InMemoryBlobStore::new(&config.storage.bucket)),
            table: Arc::new(InMemoryTableStore::new(&config.storage.table)),
            log: Arc::new(InMemoryLogSink::new(
                &config.log_sink.group,
                &config.log_sink.stream,
            )),
            notifier: Arc::new(InMemoryNotifier::new(&config.notification.topic)),
        }
    }

    /// Trait-object view sharing the same instances
    pub fn backend(&self) -> Backend {
        Backend {
            queue: self.queue.clone(),
            dead_letter_queue: self
                .dead_letter_queue
                .clone()
                .map(|dlq| dlq as Arc<dyn MessageQueue>),
            sinks: Sinks {
                blob: self.blob.clone(),
                table: self.table.clone(),
                log: self.log.clone(),
                notifier: self.notifier.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_memory_backend() {
        let config = OrderflowConfig {
            backend: BackendKind::Memory,
            ..Default::default()
        };

        let backend = build_backend(&config).await.unwrap();
        assert_eq!(backend.queue.name(), "fila-pedidos");
        assert!(backend.dead_letter_queue.is_none());
        assert_eq!(backend.sinks.blob.bucket(), "pedidos-processados");
        assert_eq!(backend.sinks.table.table_name(), "pedidos");
        assert_eq!(backend.sinks.log.destination(), "pedidos-logs/stream1");
        assert_eq!(backend.sinks.notifier.topic(), "pedidos-concluidos");
    }

    #[tokio::test]
    async fn test_memory_backend_shares_instances() {
        let mut config = OrderflowConfig::default();
        config.queue.dead_letter_queue = Some("fila-pedidos-dlq".to_string());

        let memory = MemoryBackend::from_config(&config);
        let backend = memory.backend();
        backend.provision().await.unwrap();

        backend.queue.send("hello").await.unwrap();
        assert_eq!(memory.queue.len(), 1);
        assert_eq!(
            backend.dead_letter_queue.as_ref().map(|q| q.name().to_string()),
            Some("fila-pedidos-dlq".to_string())
        );
    }

    #[tokio::test]
    async fn test_provision_is_idempotent_and_keeps_data() {
        let config = OrderflowConfig::default();
        let memory = MemoryBackend::from_config(&config);
        let backend = memory.backend();

        backend.provision().await.unwrap();
        backend.queue.send("hello").await.unwrap();
        backend.provision().await.unwrap();

        assert_eq!(memory.queue.bodies(), vec!["hello".to_string()]);
    }
}
