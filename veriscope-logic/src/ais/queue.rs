use std::collections::VecDeque;
use std::sync::Mutex;

use super::message::AisMessage;
use crate::metrics;

/// Fixed-capacity ring buffer of pending messages. On overflow, the oldest
/// element is dropped in favor of the freshest one.
pub struct IngestQueue {
    capacity: usize,
    inner: Mutex<VecDeque<AisMessage>>,
}

impl IngestQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, message: AisMessage) {
        let mut guard = self.inner.lock().expect("ingest queue mutex poisoned");
        if guard.len() >= self.capacity {
            guard.pop_front();
            metrics::AIS_MESSAGES_DROPPED.inc();
            tracing::warn!("ingest queue full, dropped oldest message");
        }
        guard.push_back(message);
        metrics::AIS_QUEUE_SIZE.set(guard.len() as i64);
    }

    /// Pushes a message back to the front of the queue (used when a batch fails
    /// to persist and must be retried ahead of newer arrivals).
    pub fn requeue_front(&self, messages: Vec<AisMessage>) {
        let mut guard = self.inner.lock().expect("ingest queue mutex poisoned");
        for message in messages.into_iter().rev() {
            guard.push_front(message);
        }
        // requeueing can legitimately push us over capacity; truncate from the
        // tail so the most recently arrived (nearer the front) survive.
        while guard.len() > self.capacity {
            guard.pop_back();
            metrics::AIS_MESSAGES_DROPPED.inc();
        }
        metrics::AIS_QUEUE_SIZE.set(guard.len() as i64);
    }

    /// Drains up to `batch_size` messages in FIFO order.
    pub fn drain_batch(&self, batch_size: usize) -> Vec<AisMessage> {
        let mut guard = self.inner.lock().expect("ingest queue mutex poisoned");
        let n = batch_size.min(guard.len());
        let batch: Vec<_> = guard.drain(..n).collect();
        metrics::AIS_QUEUE_SIZE.set(guard.len() as i64);
        batch
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("ingest queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NavStatus;
    use chrono::Utc;

    fn msg(mmsi: &str) -> AisMessage {
        AisMessage {
            mmsi: mmsi.to_string(),
            timestamp_utc: Utc::now(),
            lat: 0.0,
            lon: 0.0,
            sog: None,
            cog: None,
            heading: None,
            nav_status: NavStatus::Unknown,
            destination: None,
            eta: None,
        }
    }

    #[test]
    fn drops_oldest_when_full() {
        let q = IngestQueue::new(2);
        q.push(msg("1"));
        q.push(msg("2"));
        q.push(msg("3"));
        let batch = q.drain_batch(10);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].mmsi, "2");
        assert_eq!(batch[1].mmsi, "3");
    }

    #[test]
    fn drain_batch_respects_cap() {
        let q = IngestQueue::new(10);
        for i in 0..5 {
            q.push(msg(&i.to_string()));
        }
        let batch = q.drain_batch(3);
        assert_eq!(batch.len(), 3);
        assert_eq!(q.len(), 2);
    }
}
