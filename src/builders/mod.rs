//! Builders wiring the core from configuration.

pub mod service_builder;

pub use service_builder::{build_store, SignupService};
