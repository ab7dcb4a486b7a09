//! Service configuration structures.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage backend selection, resolved once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    #[default]
    InMemory,
    /// Relational store (schema only in this crate).
    Postgres,
}

impl FromStr for StoreBackendConfig {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "postgres" | "sql" => Ok(Self::Postgres),
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

/// Audit queue settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Entries buffered before producers block.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 20_000 }
    }
}

/// Window scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Tick period in milliseconds; one tick counts down one second.
    pub tick_interval_ms: u64,
    /// Remaining seconds at which the catalog is preloaded.
    pub preload_threshold_secs: i64,
    /// Minimum distance between two openings on one school.
    pub min_spacing_secs: i64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            preload_threshold_secs: 300,
            min_spacing_secs: 1795,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Audit queue.
    pub queue: QueueConfig,
    /// Window scheduler.
    pub timers: TimerConfig,
    /// Storage backend.
    pub store: StoreBackendConfig,
}

impl TimerConfig {
    /// Validate timer values.
    ///
    /// # Errors
    ///
    /// A message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".into());
        }
        if self.preload_threshold_secs < 0 {
            return Err("preload_threshold_secs must not be negative".into());
        }
        if self.min_spacing_secs <= 0 {
            return Err("min_spacing_secs must be greater than 0".into());
        }
        // Two windows of one school must never preload over each other.
        if self.preload_threshold_secs >= self.min_spacing_secs {
            return Err("preload_threshold_secs must be below min_spacing_secs".into());
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// A message naming the offending section and field.
    pub fn validate(&self) -> Result<(), String> {
        if self.queue.capacity == 0 {
            return Err("queue: capacity must be greater than 0".into());
        }
        self.timers
            .validate()
            .map_err(|e| format!("timers: {e}"))?;
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SIGNUP_*` environment variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Errors
    ///
    /// Unparseable variable or validation message.
    pub fn from_env() -> Result<Self, String> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Unparseable value or validation message.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, String> {
            raw.trim()
                .parse()
                .map_err(|_| format!("{key}: cannot parse `{raw}`"))
        }

        let mut cfg = Self::default();
        if let Some(raw) = lookup("SIGNUP_QUEUE_CAPACITY") {
            cfg.queue.capacity = parse("SIGNUP_QUEUE_CAPACITY", &raw)?;
        }
        if let Some(raw) = lookup("SIGNUP_TICK_INTERVAL_MS") {
            cfg.timers.tick_interval_ms = parse("SIGNUP_TICK_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = lookup("SIGNUP_PRELOAD_THRESHOLD_SECS") {
            cfg.timers.preload_threshold_secs = parse("SIGNUP_PRELOAD_THRESHOLD_SECS", &raw)?;
        }
        if let Some(raw) = lookup("SIGNUP_MIN_SPACING_SECS") {
            cfg.timers.min_spacing_secs = parse("SIGNUP_MIN_SPACING_SECS", &raw)?;
        }
        if let Some(raw) = lookup("SIGNUP_STORE") {
            cfg.store = raw.parse()?;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
