//! In-process backend
//!
//! Implements every service trait in memory. Used by `backend = "memory"`
//! to rehearse the pipeline without any cloud services, and by tests.

pub mod fault;
pub mod queue;
pub mod sinks;

pub use fault::FaultInjector;
pub use queue::InMemoryQueue;
pub use sinks::{
    InMemoryBlobStore, InMemoryLogSink, InMemoryNotifier, InMemoryTableStore, LogEvent,
    StoredObject,
};
