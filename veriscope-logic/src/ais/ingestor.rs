use std::sync::Arc;

use sea_orm::DatabaseConnection;
use serde::Serialize;

use crate::metrics;
use crate::settings::AisSettings;

use super::client::{AisClient, ClientState, ConnectionStatus};
use super::dedup::DedupSet;
use super::queue::IngestQueue;
use super::repository::{self, DbVesselRoster};
use super::simulation::Simulator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    Live,
    Simulation,
}

impl IngestMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestMode::Live => "live",
            IngestMode::Simulation => "simulation",
        }
    }
}

/// A point-in-time snapshot of the ingestor's internal state, exposed for diagnostics.
#[derive(Debug, Serialize)]
pub struct IngestorSnapshot {
    pub mode: &'static str,
    pub connection_status: &'static str,
    pub reconnect_attempts: u32,
    pub queue_size: usize,
    pub hash_set_size: usize,
    pub is_healthy: bool,
}

/// Wires together the upstream client (or simulator fallback), the dedup filter, the
/// ingest queue, and the batch persistence worker. One instance runs for the lifetime
/// of the process.
pub struct Ingestor {
    mode: IngestMode,
    settings: AisSettings,
    queue: Arc<IngestQueue>,
    dedup: Arc<std::sync::Mutex<DedupSet>>,
    client_state: Arc<ClientState>,
    db: DatabaseConnection,
}

impl Ingestor {
    pub fn new(settings: AisSettings, db: DatabaseConnection) -> Self {
        let mode = if settings.upstream_url.is_some() && settings.api_key.is_some() {
            IngestMode::Live
        } else {
            IngestMode::Simulation
        };
        let queue = Arc::new(IngestQueue::new(settings.max_queue_size));
        let dedup = Arc::new(std::sync::Mutex::new(DedupSet::new(settings.max_hash_set_size)));
        Self {
            mode,
            settings,
            queue,
            dedup,
            client_state: Arc::new(ClientState::default()),
            db,
        }
    }

    pub fn snapshot(&self) -> IngestorSnapshot {
        IngestorSnapshot {
            mode: self.mode.as_str(),
            connection_status: self.connection_status().as_str(),
            reconnect_attempts: self.client_state.reconnect_attempts(),
            queue_size: self.queue.len(),
            hash_set_size: self.dedup.lock().expect("dedup mutex poisoned").len(),
            is_healthy: match self.mode {
                IngestMode::Live => self.client_state.is_healthy(),
                IngestMode::Simulation => true,
            },
        }
    }

    fn connection_status(&self) -> ConnectionStatus {
        match self.mode {
            IngestMode::Live => self.client_state.status(),
            IngestMode::Simulation => ConnectionStatus::Connected,
        }
    }

    /// Runs every supervised subtask (source + batch writer + dedup cleanup) until
    /// the process is cancelled. Never returns under normal operation.
    pub async fn run(self: Arc<Self>) {
        match self.mode {
            IngestMode::Live => {
                let client = AisClient::new(
                    self.settings.clone(),
                    self.queue.clone(),
                    self.dedup.clone(),
                    self.client_state.clone(),
                );
                let writer = self.clone().run_batch_writer();
                let cleanup = self.clone().run_dedup_cleanup();
                tokio::join!(client.run(), writer, cleanup);
            }
            IngestMode::Simulation => {
                let roster = DbVesselRoster::new(self.db.clone());
                let simulator = Simulator::new(roster, self.queue.clone(), self.settings.simulation_interval);
                let writer = self.clone().run_batch_writer();
                tokio::join!(simulator.run(), writer);
            }
        }
    }

    async fn run_batch_writer(self: Arc<Self>) {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            interval.tick().await;
            let batch = self.queue.drain_batch(self.settings.batch_size);
            if batch.is_empty() {
                continue;
            }
            if let Err(err) = repository::persist_batch(&self.db, &batch).await {
                tracing::error!(error = %err, batch_size = batch.len(), "failed to persist AIS batch, requeueing");
                self.queue.requeue_front(batch);
            }
        }
    }

    async fn run_dedup_cleanup(self: Arc<Self>) {
        // the bounded dedup set already self-evicts on insert; this task exists so a
        // quiet period (no new messages) still eventually drops stale entries.
        let mut interval = tokio::time::interval(self.settings.dedup_cleanup_interval);
        loop {
            interval.tick().await;
            let len = self.dedup.lock().expect("dedup mutex poisoned").len();
            metrics::AIS_QUEUE_SIZE.set(self.queue.len() as i64);
            tracing::debug!(hash_set_size = len, "dedup cleanup tick");
        }
    }
}
