//! Bounded, ordered, single-consumer persistence queue.
//!
//! Producers push [`AuditEntry`] values into a bounded crossbeam channel and
//! return as soon as the entry is buffered. One dedicated OS thread, owning
//! its own current-thread tokio runtime, drains the channel strictly in
//! submission order and applies every entry to the [`PersistencePort`].
//!
//! - A full channel blocks the producer instead of dropping the entry.
//! - Storage failures are logged and counted, never reported to producers.
//! - Dropping the sender lets the drain thread finish the backlog and exit.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::persistence::{AuditEntry, PersistencePort};
use super::SignupError;

enum QueueMessage {
    Entry(AuditEntry),
    Flush(Sender<()>),
}

#[derive(Debug, Default)]
struct QueueCounters {
    enqueued: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time queue statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Channel bound.
    pub capacity: usize,
    /// Entries buffered but not yet drained.
    pub depth: usize,
    /// Entries accepted from producers.
    pub enqueued: u64,
    /// Entries the backend accepted.
    pub written: u64,
    /// Entries the backend rejected.
    pub failed: u64,
}

/// Handle to the audit write queue. Cheap to share behind an `Arc`.
pub struct PersistenceQueue {
    capacity: usize,
    sender: Mutex<Option<Sender<QueueMessage>>>,
    counters: Arc<QueueCounters>,
    drain: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl PersistenceQueue {
    /// Start the drain thread and return the producer handle.
    ///
    /// # Errors
    ///
    /// Fails if the OS refuses to spawn the drain thread.
    pub fn start(capacity: usize, port: Arc<dyn PersistencePort>) -> std::io::Result<Self> {
        let (tx, rx) = bounded::<QueueMessage>(capacity);
        let counters = Arc::new(QueueCounters::default());
        let drain = spawn_drain(rx, port, Arc::clone(&counters))?;

        info!(capacity, "persistence queue started");

        Ok(Self {
            capacity,
            sender: Mutex::new(Some(tx)),
            counters,
            drain: Mutex::new(Some(drain)),
            closed: AtomicBool::new(false),
        })
    }

    fn sender(&self) -> Result<Sender<QueueMessage>, SignupError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SignupError::QueueClosed);
        }
        self.sender.lock().clone().ok_or(SignupError::QueueClosed)
    }

    /// Buffer an entry for the drain thread, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// `SignupError::QueueClosed` once [`Self::shutdown`] ran or the drain
    /// thread died.
    pub fn enqueue(&self, entry: AuditEntry) -> Result<(), SignupError> {
        let tx = self.sender()?;
        if tx.is_full() {
            warn!(
                capacity = self.capacity,
                school = %entry.school(),
                "persistence queue full, producer blocking"
            );
        }
        tx.send(QueueMessage::Entry(entry))
            .map_err(|_| SignupError::QueueClosed)?;
        self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Block until every entry enqueued before this call has been applied.
    ///
    /// # Errors
    ///
    /// `SignupError::QueueClosed` if the drain thread is gone.
    pub fn flush(&self) -> Result<(), SignupError> {
        let tx = self.sender()?;
        let (ack_tx, ack_rx) = bounded(1);
        tx.send(QueueMessage::Flush(ack_tx))
            .map_err(|_| SignupError::QueueClosed)?;
        drop(tx);
        ack_rx.recv().map_err(|_| SignupError::QueueClosed)
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        let depth = self.sender.lock().as_ref().map_or(0, Sender::len);
        QueueStats {
            capacity: self.capacity,
            depth,
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting entries, drain the backlog and join the drain thread.
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("shutting down persistence queue");

        // Dropping the last sender ends the drain loop after the backlog.
        self.sender.lock().take();

        if let Some(handle) = self.drain.lock().take() {
            if handle.join().is_err() {
                warn!("persistence drain thread panicked");
            }
        }
        let stats = self.stats();
        info!(
            written = stats.written,
            failed = stats.failed,
            "persistence queue shut down"
        );
    }
}

impl Drop for PersistenceQueue {
    fn drop(&mut self) {
        // Detach rather than join: explicit shutdown() is the graceful path.
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.sender.lock().take();
            debug!("persistence queue dropped without shutdown, drain thread detached");
        }
    }
}

fn spawn_drain(
    rx: Receiver<QueueMessage>,
    port: Arc<dyn PersistencePort>,
    counters: Arc<QueueCounters>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("signup-audit-drain".into())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!(error = %e, "failed to build drain runtime");
                    return;
                }
            };

            while let Ok(message) = rx.recv() {
                match message {
                    QueueMessage::Entry(entry) => {
                        match rt.block_on(entry.apply(port.as_ref())) {
                            Ok(()) => {
                                counters.written.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                counters.failed.fetch_add(1, Ordering::Relaxed);
                                error!(error = %e, entry = ?entry, "audit write failed");
                            }
                        }
                    }
                    QueueMessage::Flush(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
            debug!("persistence drain thread exiting");
        })
}
