//! # Course Signup
//!
//! Admission engine for timed, capacity-limited course sign-up events.
//!
//! An administrator schedules a wall-clock opening per course category. Shortly
//! before the opening the catalog is preloaded; at the opening students race
//! for a fixed number of seats per course, holding at most one seat per
//! school at a time.
//!
//! ## Core Problem Solved
//!
//! - **No oversold seats**: every check and mutation of a school runs under one
//!   exclusive lock
//! - **No double enrollment**: a student holding any seat in a school is
//!   refused everywhere else until they cancel
//! - **Exactly-once seat accounting on cancel**: enrolled counts are the size
//!   of the enrolled set
//! - **Storage off the hot path**: audit writes go through a bounded queue
//!   drained by a dedicated thread
//!
//! ## Components
//!
//! - [`core::AdmissionController`]: register / cancel / eligibility listing
//! - [`core::Scheduler`]: one-second tick driving `Pending -> Preloading -> Loaded -> open`
//! - [`core::PersistenceQueue`]: ordered, blocking-on-full audit writer
//! - [`core::PersistencePort`]: storage abstraction selected once at startup
//!
//! ```rust,ignore
//! use course_signup::builders::SignupService;
//! use course_signup::config::ServiceConfig;
//! use course_signup::runtime::TokioSpawner;
//!
//! let service = SignupService::from_config(&ServiceConfig::from_env()?)?;
//! service.start(&TokioSpawner::current());
//!
//! service.scheduler.set_timer("north", "clubs", "clubs_2026", "18:30")?;
//! // ... at 18:30
//! service.admission.register("north", "240117", "chess")?;
//! ```
//!
//! For complete scenarios, see:
//! - `tests/admission_concurrency_test.rs` - seat races
//! - `tests/scheduler_test.rs` - window lifecycle

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Admission control, scheduling and the audit write path.
pub mod core;
/// Configuration models for the queue, timers and storage backend.
pub mod config;
/// Builders wiring the core from configuration.
pub mod builders;
/// Storage backend adapters.
pub mod infra;
/// Runtime adapters and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
