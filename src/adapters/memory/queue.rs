//! In-memory message queue
//!
//! At-least-once queue with SQS-like semantics: a received message stays in
//! the queue, invisible for the visibility timeout, until it is deleted with
//! the receipt handle of its latest delivery.

use super::fault::FaultInjector;
use crate::adapters::services::traits::{MessageQueue, QueueMessage};
use crate::domain::{QueueError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredMessage {
    message_id: String,
    body: String,
    receive_count: u32,
    receipt_handle: Option<String>,
    visible_at: Option<Instant>,
}

impl StoredMessage {
    fn is_visible(&self, now: Instant) -> bool {
        self.visible_at.map_or(true, |at| at <= now)
    }
}

/// In-memory queue
pub struct InMemoryQueue {
    name: String,
    visibility_timeout: Duration,
    messages: Mutex<VecDeque<StoredMessage>>,
    arrivals: Notify,
    faults: FaultInjector,
}

impl InMemoryQueue {
    /// Create an empty queue whose undeleted messages are visible again immediately
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_visibility_timeout(name, Duration::ZERO)
    }

    /// Create an empty queue with a visibility timeout
    pub fn with_visibility_timeout(name: impl Into<String>, visibility_timeout: Duration) -> Self {
        Self {
            name: name.into(),
            visibility_timeout,
            messages: Mutex::new(VecDeque::new()),
            arrivals: Notify::new(),
            faults: FaultInjector::default(),
        }
    }

    /// Fault injection for receive and delete calls
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Number of messages held, visible or in flight
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue holds no messages at all
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Bodies of all held messages, oldest first
    pub fn bodies(&self) -> Vec<String> {
        self.lock().iter().map(|m| m.body.clone()).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<StoredMessage>> {
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Earliest time an in-flight message becomes visible again
    fn next_visible_at(&self, now: Instant) -> Option<Instant> {
        self.lock()
            .iter()
            .filter_map(|m| m.visible_at)
            .filter(|at| *at > now)
            .min()
    }

    fn take_visible(&self) -> Option<QueueMessage> {
        let now = Instant::now();
        let mut messages = self.lock();
        let stored = messages.iter_mut().find(|m| m.is_visible(now))?;

        let receipt_handle = Uuid::new_v4().to_string();
        stored.receive_count += 1;
        stored.receipt_handle = Some(receipt_handle.clone());
        stored.visible_at = Some(now + self.visibility_timeout);

        Some(QueueMessage {
            message_id: stored.message_id.clone(),
            receipt_handle,
            body: stored.body.clone(),
            receive_count: stored.receive_count,
        })
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, body: &str) -> Result<String> {
        if self.faults.trip() {
            return Err(QueueError::ConnectionFailed(format!(
                "injected fault sending to {}",
                self.name
            ))
            .into());
        }

        let message_id = Uuid::new_v4().to_string();
        self.lock().push_back(StoredMessage {
            message_id: message_id.clone(),
            body: body.to_string(),
            receive_count: 0,
            receipt_handle: None,
            visible_at: None,
        });
        // Wakes current waiters only; no permit is stored for later receives
        self.arrivals.notify_waiters();

        tracing::trace!(queue = %self.name, message_id = %message_id, "Message enqueued");
        Ok(message_id)
    }

    async fn receive(&self, wait: Duration) -> Result<Option<QueueMessage>> {
        if self.faults.trip() {
            return Err(QueueError::ReceiveFailed(format!(
                "injected fault receiving from {}",
                self.name
            ))
            .into());
        }

        let deadline = Instant::now() + wait;
        loop {
            // Registered before the check so a send in between is not missed
            let arrival = self.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            if let Some(message) = self.take_visible() {
                return Ok(Some(message));
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }

            let wake_at = self
                .next_visible_at(now)
                .map_or(deadline, |at| at.min(deadline));
            let _ = tokio::time::timeout_at(wake_at, arrival).await;
        }
    }

    async fn delete(&self, receipt_handle: &str) -> Result<()> {
        if self.faults.trip() {
            return Err(QueueError::DeleteFailed(format!(
                "injected fault deleting from {}",
                self.name
            ))
            .into());
        }

        let mut messages = self.lock();
        let position = messages
            .iter()
            .position(|m| m.receipt_handle.as_deref() == Some(receipt_handle))
            .ok_or_else(|| QueueError::InvalidReceiptHandle(receipt_handle.to_string()))?;
        messages.remove(position);
        Ok(())
    }

    async fn approximate_len(&self) -> Result<u64> {
        let now = Instant::now();
        Ok(self.lock().iter().filter(|m| m.is_visible(now)).count() as u64)
    }
}
