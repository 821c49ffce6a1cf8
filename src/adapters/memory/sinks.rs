//! In-memory sinks
//!
//! Each sink keeps what it was given so tests can assert on it, counts
//! successful writes, and fails on demand through its [`FaultInjector`].

use super::fault::FaultInjector;
use crate::adapters::services::traits::{BlobStore, LogSink, Notifier, TableStore};
use crate::domain::{Order, OrderId, Result, SinkError};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn injected(sink: &str) -> SinkError {
    SinkError::ConnectionFailed {
        sink: sink.to_string(),
        message: "injected fault".to_string(),
    }
}

/// Stored blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// In-memory blob store
#[derive(Debug)]
pub struct InMemoryBlobStore {
    bucket: String,
    objects: Mutex<BTreeMap<String, StoredObject>>,
    writes: AtomicUsize,
    faults: FaultInjector,
}

impl InMemoryBlobStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: Mutex::new(BTreeMap::new()),
            writes: AtomicUsize::new(0),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Number of successful `put_object` calls, overwrites included
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        lock(&self.objects).get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        if self.faults.trip() {
            return Err(injected("blob store").into());
        }
        lock(&self.objects).insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// In-memory table store keyed by order id
#[derive(Debug)]
pub struct InMemoryTableStore {
    table: String,
    items: Mutex<BTreeMap<String, Order>>,
    processed: Mutex<BTreeSet<String>>,
    writes: AtomicUsize,
    faults: FaultInjector,
}

impl InMemoryTableStore {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            items: Mutex::new(BTreeMap::new()),
            processed: Mutex::new(BTreeSet::new()),
            writes: AtomicUsize::new(0),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Number of successful `put_item` calls, overwrites included
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn item(&self, order_id: &str) -> Option<Order> {
        lock(&self.items).get(order_id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.items).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.items).is_empty()
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    fn table_name(&self) -> &str {
        &self.table
    }

    async fn put_item(&self, order: &Order) -> Result<()> {
        if self.faults.trip() {
            return Err(injected("table store").into());
        }
        lock(&self.items).insert(order.order_id.to_string(), order.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn is_processed(&self, order_id: &OrderId) -> Result<bool> {
        if self.faults.trip() {
            return Err(injected("table store").into());
        }
        Ok(lock(&self.processed).contains(order_id.as_str()))
    }

    async fn mark_processed(&self, order_id: &OrderId) -> Result<()> {
        if self.faults.trip() {
            return Err(injected("table store").into());
        }
        lock(&self.processed).insert(order_id.to_string());
        Ok(())
    }
}

/// Event appended to the in-memory log sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp_ms: i64,
    pub message: String,
}

/// In-memory log stream
#[derive(Debug)]
pub struct InMemoryLogSink {
    group: String,
    stream: String,
    events: Mutex<Vec<LogEvent>>,
    faults: FaultInjector,
}

impl InMemoryLogSink {
    pub fn new(group: impl Into<String>, stream: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            stream: stream.into(),
            events: Mutex::new(Vec::new()),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub fn events(&self) -> Vec<LogEvent> {
        lock(&self.events).clone()
    }

    pub fn write_count(&self) -> usize {
        lock(&self.events).len()
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    fn destination(&self) -> String {
        format!("{}/{}", self.group, self.stream)
    }

    async fn put_log_event(&self, timestamp_ms: i64, message: &str) -> Result<()> {
        if self.faults.trip() {
            return Err(injected("log sink").into());
        }
        lock(&self.events).push(LogEvent {
            timestamp_ms,
            message: message.to_string(),
        });
        Ok(())
    }
}

/// In-memory notification topic
#[derive(Debug)]
pub struct InMemoryNotifier {
    topic: String,
    published: Mutex<Vec<String>>,
    faults: FaultInjector,
}

impl InMemoryNotifier {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            published: Mutex::new(Vec::new()),
            faults: FaultInjector::default(),
        }
    }

    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    pub fn published(&self) -> Vec<String> {
        lock(&self.published).clone()
    }

    pub fn write_count(&self) -> usize {
        lock(&self.published).len()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, message: &str) -> Result<String> {
        if self.faults.trip() {
            return Err(injected("notification topic").into());
        }
        lock(&self.published).push(message.to_string());
        Ok(Uuid::new_v4().to_string())
    }
}
