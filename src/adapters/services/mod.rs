//! Service abstraction layer
//!
//! Traits for the queue and the four sinks, and the factory that builds a
//! [`Backend`] from configuration.

pub mod factory;
pub mod traits;

pub use factory::{build_backend, Backend, MemoryBackend, Sinks};
pub use traits::{BlobStore, LogSink, MessageQueue, Notifier, QueueMessage, TableStore};
