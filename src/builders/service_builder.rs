//! Assemble a running sign-up service from [`ServiceConfig`].

use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::sync::watch;

use crate::config::{ServiceConfig, StoreBackendConfig};
use crate::core::{
    AdmissionController, AppResult, PersistencePort, PersistenceQueue, Scheduler, SchoolRegistry,
    Spawn,
};
use crate::infra::{InMemoryStore, PostgresStore};

/// Resolve the configured backend. The core never branches on the result.
#[must_use]
pub fn build_store(cfg: &StoreBackendConfig) -> Arc<dyn PersistencePort> {
    match cfg {
        StoreBackendConfig::InMemory => Arc::new(InMemoryStore::new()),
        StoreBackendConfig::Postgres => Arc::new(PostgresStore::new()),
    }
}

/// Every long-lived component of the core, sharing one registry and queue.
pub struct SignupService {
    /// Name -> school map.
    pub registry: Arc<SchoolRegistry>,
    /// Student-facing operations.
    pub admission: AdmissionController,
    /// Window timers.
    pub scheduler: Arc<Scheduler>,
    /// Audit write queue.
    pub queue: Arc<PersistenceQueue>,
    shutdown: watch::Sender<bool>,
}

impl SignupService {
    /// Build with the backend named in `cfg.store`.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a drain thread that cannot be spawned.
    pub fn from_config(cfg: &ServiceConfig) -> AppResult<Self> {
        Self::with_port(cfg, build_store(&cfg.store))
    }

    /// Build over an explicit backend.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a drain thread that cannot be spawned.
    pub fn with_port(cfg: &ServiceConfig, port: Arc<dyn PersistencePort>) -> AppResult<Self> {
        cfg.validate().map_err(|e| anyhow!("config invalid: {e}"))?;

        let registry = Arc::new(SchoolRegistry::new());
        let queue = Arc::new(
            PersistenceQueue::start(cfg.queue.capacity, Arc::clone(&port))
                .context("spawning persistence drain thread")?,
        );
        let admission =
            AdmissionController::new(Arc::clone(&registry), Arc::clone(&queue), Arc::clone(&port));
        let scheduler = Arc::new(Scheduler::new(
            Arc::clone(&registry),
            port,
            cfg.timers.clone(),
        ));
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            registry,
            admission,
            scheduler,
            queue,
            shutdown,
        })
    }

    /// Start the recurring scheduler tick on `spawner`.
    pub fn start<S: Spawn>(&self, spawner: &S) {
        self.scheduler.start(spawner, self.shutdown.subscribe());
    }

    /// Stop the tick and drain the audit queue. A later [`Self::start`] is a no-op.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        self.queue.shutdown();
    }
}
