//! Wall-clock scheduler for registration windows.
//!
//! Each live [`OpenEvent`] counts down once per tick and walks
//! `Pending -> Preloading -> Loaded`, then opens its school and disappears.
//! The event map lock is only held to advance counters; catalog loads run
//! with no lock held, and a school's lock is taken just long enough to swap
//! the catalog or flip the window open.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{CourseRecord, School};
use super::persistence::PersistencePort;
use super::registry::SchoolRegistry;
use super::SignupError;
use crate::config::TimerConfig;
use crate::util::clock::{format_hms, local_now};

/// Handle of a live event.
pub type EventId = Uuid;

/// Abstraction for spawning the recurring tick on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Progress of an event towards opening. Opening itself is terminal and
/// removes the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    /// Counting down, catalog untouched.
    Pending,
    /// Inside the preload threshold, catalog not swapped yet (or last load failed).
    Preloading,
    /// Catalog swapped, waiting for zero.
    Loaded,
}

/// A scheduled closed -> open transition for one category of one school.
#[derive(Debug, Clone)]
pub struct OpenEvent {
    /// Handle.
    pub id: EventId,
    /// Owning school.
    pub school: Arc<School>,
    /// Category label applied when the window opens.
    pub category: String,
    /// Catalog table loaded at preload.
    pub table: String,
    /// Seconds until opening.
    pub remaining_secs: i64,
    /// Remaining-seconds value at which the catalog is loaded.
    pub preload_threshold_secs: i64,
    /// Current phase.
    pub phase: EventPhase,
}

/// What `GetTimers` reports for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Category label.
    pub category: String,
    /// Catalog table.
    pub table: String,
    /// Seconds until opening.
    pub remaining_secs: i64,
    /// Same value as `HH:MM:SS`.
    pub remaining: String,
    /// Current phase.
    pub phase: EventPhase,
}

impl From<&OpenEvent> for TimerSnapshot {
    fn from(event: &OpenEvent) -> Self {
        Self {
            category: event.category.clone(),
            table: event.table.clone(),
            remaining_secs: event.remaining_secs,
            remaining: format_hms(event.remaining_secs),
            phase: event.phase,
        }
    }
}

struct PreloadJob {
    id: EventId,
    school: Arc<School>,
    category: String,
    table: String,
    open_when_loaded: bool,
}

/// Owns every live [`OpenEvent`] and drives them from a periodic tick.
pub struct Scheduler {
    registry: Arc<SchoolRegistry>,
    port: Arc<dyn PersistencePort>,
    config: TimerConfig,
    events: Mutex<HashMap<EventId, OpenEvent>>,
}

/// Parse `HH:MM` into seconds from `now` until that time today.
///
/// # Errors
///
/// `BadFormat` for anything but two digit groups forming a valid time,
/// `PastTime` when the minute has already started.
pub fn seconds_until(input: &str, now: NaiveDateTime) -> Result<i64, SignupError> {
    let bad = || SignupError::BadFormat(input.to_owned());
    let (h, m) = input.trim().split_once(':').ok_or_else(bad)?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(h) || !digits(m) {
        return Err(bad());
    }
    let hour: i64 = h.parse().map_err(|_| bad())?;
    let minute: i64 = m.parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }

    let now_h = i64::from(now.hour());
    let now_m = i64::from(now.minute());
    let now_s = i64::from(now.second());
    if (hour, minute) <= (now_h, now_m) {
        return Err(SignupError::PastTime);
    }
    Ok((hour - now_h) * 3600 + (minute - now_m) * 60 - now_s)
}

impl Scheduler {
    /// Scheduler with no events.
    pub fn new(
        registry: Arc<SchoolRegistry>,
        port: Arc<dyn PersistencePort>,
        config: TimerConfig,
    ) -> Self {
        Self {
            registry,
            port,
            config,
            events: Mutex::new(HashMap::new()),
        }
    }

    /// Timer settings in effect.
    #[must_use]
    pub const fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Schedule `category` of `school` to open at wall-clock `target` (`HH:MM`) today.
    ///
    /// # Errors
    ///
    /// `BadFormat`, `PastTime`, `TooCloseToExisting`, `UnknownSchool` or `MissingField`.
    pub fn set_timer(
        &self,
        school: &str,
        category: &str,
        table: &str,
        target: &str,
    ) -> Result<EventId, SignupError> {
        self.set_timer_at(school, category, table, target, local_now())
    }

    /// [`Self::set_timer`] against an explicit current time.
    ///
    /// # Errors
    ///
    /// Same as [`Self::set_timer`].
    pub fn set_timer_at(
        &self,
        school: &str,
        category: &str,
        table: &str,
        target: &str,
        now: NaiveDateTime,
    ) -> Result<EventId, SignupError> {
        let seconds = seconds_until(target, now)?;
        self.schedule(school, category, table, seconds)
    }

    /// Schedule an opening `seconds` from now.
    ///
    /// # Errors
    ///
    /// `BadFormat` for a non-positive count, otherwise as [`Self::set_timer`].
    pub fn set_timer_in(
        &self,
        school: &str,
        category: &str,
        table: &str,
        seconds: i64,
    ) -> Result<EventId, SignupError> {
        if seconds <= 0 {
            return Err(SignupError::BadFormat(seconds.to_string()));
        }
        self.schedule(school, category, table, seconds)
    }

    fn schedule(
        &self,
        school: &str,
        category: &str,
        table: &str,
        seconds: i64,
    ) -> Result<EventId, SignupError> {
        let school = self.registry.get_or_create(school)?;
        if category.is_empty() {
            return Err(SignupError::MissingField("category"));
        }
        if table.is_empty() {
            return Err(SignupError::MissingField("table"));
        }

        let mut events = self.events.lock();
        for other in events
            .values()
            .filter(|e| Arc::ptr_eq(&e.school, &school) && e.category != category)
        {
            let delta_secs = (other.remaining_secs - seconds).abs();
            if delta_secs < self.config.min_spacing_secs {
                warn!(
                    school = %school.name(),
                    category,
                    conflicting = %other.category,
                    delta_secs,
                    "timer rejected, too close to existing"
                );
                return Err(SignupError::TooCloseToExisting {
                    category: other.category.clone(),
                    delta_secs,
                });
            }
        }

        if let Some(existing) = events
            .values_mut()
            .find(|e| Arc::ptr_eq(&e.school, &school) && e.category == category)
        {
            let table_changed = existing.table != table;
            existing.remaining_secs = seconds;
            table.clone_into(&mut existing.table);
            if seconds > existing.preload_threshold_secs {
                existing.phase = EventPhase::Pending;
            } else if table_changed && existing.phase == EventPhase::Loaded {
                // The loaded catalog belongs to the old table.
                existing.phase = EventPhase::Preloading;
            }
            info!(
                school = %school.name(),
                category,
                remaining = %format_hms(seconds),
                "timer rescheduled"
            );
            return Ok(existing.id);
        }

        let id = Uuid::new_v4();
        events.insert(
            id,
            OpenEvent {
                id,
                school: Arc::clone(&school),
                category: category.to_owned(),
                table: table.to_owned(),
                remaining_secs: seconds,
                preload_threshold_secs: self.config.preload_threshold_secs,
                phase: EventPhase::Pending,
            },
        );
        info!(
            school = %school.name(),
            category,
            table,
            remaining = %format_hms(seconds),
            "timer set"
        );
        Ok(id)
    }

    /// Drop a not yet opened event.
    ///
    /// # Errors
    ///
    /// `TimerNotFound` when `school` has no event for `category`.
    pub fn remove_timer(&self, school: &str, category: &str) -> Result<(), SignupError> {
        let school = self.registry.get_or_create(school)?;
        let mut events = self.events.lock();
        let id = events
            .values()
            .find(|e| Arc::ptr_eq(&e.school, &school) && e.category == category)
            .map(|e| e.id)
            .ok_or_else(|| SignupError::TimerNotFound(category.to_owned()))?;
        events.remove(&id);
        info!(school = %school.name(), category, "timer removed");
        Ok(())
    }

    /// Live events of `school`, soonest first.
    ///
    /// # Errors
    ///
    /// `UnknownSchool` for an empty name.
    pub fn get_timers(&self, school: &str) -> Result<Vec<TimerSnapshot>, SignupError> {
        let school = self.registry.get_or_create(school)?;
        let mut timers: Vec<TimerSnapshot> = self
            .events
            .lock()
            .values()
            .filter(|e| Arc::ptr_eq(&e.school, &school))
            .map(TimerSnapshot::from)
            .collect();
        timers.sort_by(|a, b| {
            a.remaining_secs
                .cmp(&b.remaining_secs)
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(timers)
    }

    /// Number of live events across all schools.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.events.lock().len()
    }

    /// Advance every live event by one second.
    ///
    /// No-op when nothing is scheduled. A failed catalog load leaves the
    /// event in `Preloading` so the next tick retries it.
    pub async fn tick(&self) {
        let mut jobs = Vec::new();
        let mut opening = Vec::new();
        {
            let mut events = self.events.lock();
            if events.is_empty() {
                return;
            }
            events.retain(|_, event| {
                event.remaining_secs = (event.remaining_secs - 1).max(0);
                if event.remaining_secs == 0 && event.phase == EventPhase::Loaded {
                    opening.push((Arc::clone(&event.school), event.category.clone()));
                    return false;
                }
                let due = event.remaining_secs <= event.preload_threshold_secs;
                if due && event.phase != EventPhase::Loaded {
                    event.phase = EventPhase::Preloading;
                    jobs.push(PreloadJob {
                        id: event.id,
                        school: Arc::clone(&event.school),
                        category: event.category.clone(),
                        table: event.table.clone(),
                        open_when_loaded: event.remaining_secs == 0,
                    });
                }
                true
            });
        }

        for (school, category) in opening {
            school.open(&category);
            info!(school = %school.name(), category = %category, "registration opened");
        }

        for job in jobs {
            match self.port.load_courses(job.school.name(), &job.table).await {
                Ok(records) => self.finish_preload(job, records),
                Err(e) => warn!(
                    school = %job.school.name(),
                    category = %job.category,
                    table = %job.table,
                    error = %e,
                    "catalog preload failed, retrying next tick"
                ),
            }
        }
    }

    fn finish_preload(&self, job: PreloadJob, records: Vec<CourseRecord>) {
        {
            let mut events = self.events.lock();
            let Some(event) = events.get_mut(&job.id) else {
                debug!(category = %job.category, "event gone before preload finished");
                return;
            };
            if event.phase != EventPhase::Preloading || event.table != job.table {
                debug!(category = %job.category, "event rescheduled during preload, discarding catalog");
                return;
            }
            if job.open_when_loaded {
                events.remove(&job.id);
            } else {
                event.phase = EventPhase::Loaded;
            }
        }

        let courses = records.len();
        job.school.replace_catalog(records);
        info!(
            school = %job.school.name(),
            category = %job.category,
            courses,
            "catalog preloaded"
        );
        if job.open_when_loaded {
            job.school.open(&job.category);
            info!(school = %job.school.name(), category = %job.category, "registration opened");
        }
    }

    /// Run [`Self::tick`] every `tick_interval_ms` until `shutdown` turns true.
    ///
    /// Missed ticks are replayed in a burst so countdowns stay aligned with
    /// the wall clock after a slow catalog load.
    pub fn start<S: Spawn>(self: &Arc<Self>, spawner: &S, mut shutdown: watch::Receiver<bool>) {
        let scheduler = Arc::clone(self);
        let period_ms = self.config.tick_interval_ms;
        let period = Duration::from_millis(period_ms);
        spawner.spawn(async move {
            if *shutdown.borrow_and_update() {
                debug!("scheduler shut down before start");
                return;
            }
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            // The first tick completes immediately.
            ticker.tick().await;
            info!(period_ms, "scheduler started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => scheduler.tick().await,
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("scheduler stopped");
        });
    }
}
