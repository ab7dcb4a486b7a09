//! Configuration models for the queue, the timers and the storage backend.

pub mod service;

pub use service::{QueueConfig, ServiceConfig, StoreBackendConfig, TimerConfig};
