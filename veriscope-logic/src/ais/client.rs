use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use rand::Rng;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::metrics;
use crate::settings::AisSettings;

use super::dedup::DedupSet;
use super::message::{parse_upstream_record, AisMessage};
use super::queue::IngestQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting,
    Unhealthy,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Shared, lock-free connection state, readable from the ingestor's observability snapshot
/// without coordinating with the live connection task.
#[derive(Default)]
pub struct ClientState {
    reconnect_attempts: AtomicU32,
    connected: AtomicBool,
    unhealthy: AtomicBool,
}

impl ClientState {
    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.unhealthy.load(Ordering::Relaxed) {
            ConnectionStatus::Unhealthy
        } else if self.connected.load(Ordering::Relaxed) {
            ConnectionStatus::Connected
        } else if self.reconnect_attempts() > 0 {
            ConnectionStatus::Reconnecting
        } else {
            ConnectionStatus::Connecting
        }
    }

    pub fn is_healthy(&self) -> bool {
        !self.unhealthy.load(Ordering::Relaxed)
    }
}

/// Connects to the upstream AIS feed, subscribes, and feeds normalized, deduplicated
/// messages into the ingest queue. Runs until cancelled; reconnects on any error.
pub struct AisClient {
    settings: AisSettings,
    queue: Arc<IngestQueue>,
    dedup: Arc<std::sync::Mutex<DedupSet>>,
    state: Arc<ClientState>,
}

impl AisClient {
    pub fn new(
        settings: AisSettings,
        queue: Arc<IngestQueue>,
        dedup: Arc<std::sync::Mutex<DedupSet>>,
        state: Arc<ClientState>,
    ) -> Self {
        Self {
            settings,
            queue,
            dedup,
            state,
        }
    }

    /// Runs the reconnect loop forever. Intended to be spawned as a supervised task.
    pub async fn run(self) {
        let url = self
            .settings
            .upstream_url
            .clone()
            .expect("AisClient::run requires upstream_url to be configured");

        loop {
            match self.connect_once(url.as_str()).await {
                Ok(()) => {
                    // clean close; treat like any other disconnect and reconnect
                }
                Err(err) => {
                    tracing::warn!(error = %err, "AIS upstream connection failed");
                }
            }

            self.state.connected.store(false, Ordering::Relaxed);
            let attempt = self
                .state
                .reconnect_attempts
                .fetch_add(1, Ordering::Relaxed)
                + 1;
            metrics::AIS_RECONNECT_ATTEMPTS.inc();

            if attempt >= self.settings.max_reconnect_attempts {
                self.state.unhealthy.store(true, Ordering::Relaxed);
            }

            let delay = backoff_delay(
                attempt.min(self.settings.max_reconnect_attempts),
                self.settings.reconnect_base_delay,
                self.settings.reconnect_max_delay,
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn connect_once(&self, url: &str) -> anyhow::Result<()> {
        let (stream, _response) = connect_async(url).await?;
        let (mut write, mut read) = stream.split();

        let subscribe = serde_json::json!({
            "APIKey": self.settings.api_key,
            "BoundingBoxes": [[[-90.0, -180.0], [90.0, 180.0]]],
            "FilterMessageTypes": ["PositionReport"],
        });
        write
            .send(WsMessage::Text(subscribe.to_string()))
            .await?;

        self.state.connected.store(true, Ordering::Relaxed);
        self.state.unhealthy.store(false, Ordering::Relaxed);
        self.state.reconnect_attempts.store(0, Ordering::Relaxed);
        tracing::info!("connected to AIS upstream");

        while let Some(frame) = read.next().await {
            match frame? {
                WsMessage::Text(text) => self.handle_raw(&text),
                WsMessage::Ping(payload) => {
                    write.send(WsMessage::Pong(payload)).await?;
                }
                WsMessage::Close(_) => break,
                _ => {}
            }
        }

        Ok(())
    }

    fn handle_raw(&self, raw: &str) {
        let message = match parse_upstream_record(raw) {
            Ok(Some(m)) => m,
            Ok(None) => return,
            Err(err) => {
                tracing::debug!(error = %err, "dropping unparsable AIS record");
                return;
            }
        };
        if !message.is_valid() {
            return;
        }

        metrics::AIS_MESSAGES_RECEIVED.inc();

        let is_duplicate = self
            .dedup
            .lock()
            .expect("dedup set mutex poisoned")
            .check_and_insert(message.fingerprint());
        if is_duplicate {
            metrics::AIS_DUPLICATES_FILTERED.inc();
            return;
        }

        self.queue.push(message);
    }
}

/// `min(base * 2^attempt, max) + U[0, 1s)`.
fn backoff_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exp = base.saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX));
    let capped = exp.min(max);
    let jitter = Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..1.0));
    capped + jitter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_capped_at_max_plus_jitter() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);
        for attempt in 0..20 {
            let d = backoff_delay(attempt, base, max);
            assert!(d <= max + Duration::from_secs(1));
        }
    }

    #[test]
    fn backoff_grows_exponentially_before_the_cap() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(60);
        let d0 = backoff_delay(0, base, max);
        let d2 = backoff_delay(2, base, max);
        assert!(d2 >= d0);
    }

    #[test]
    fn fresh_state_reports_connecting() {
        let state = ClientState::default();
        assert_eq!(state.status(), ConnectionStatus::Connecting);
        assert!(state.is_healthy());
    }

    #[test]
    fn state_reports_unhealthy_once_flagged() {
        let state = ClientState::default();
        state.unhealthy.store(true, Ordering::Relaxed);
        assert_eq!(state.status(), ConnectionStatus::Unhealthy);
        assert!(!state.is_healthy());
    }
}
