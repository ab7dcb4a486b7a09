//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "course_signup=info";

/// Install an env-filtered fmt subscriber unless the host already set one.
///
/// `RUST_LOG` wins when present; otherwise [`DEFAULT_DIRECTIVE`] keeps the
/// window transitions and persistence failures visible.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
