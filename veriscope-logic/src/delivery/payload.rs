use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::alert::Candidate;

pub const PAYLOAD_VERSION: &str = "1.1";
const EVENT_TYPE: &str = "VERISCOPE_SIGNAL_CLUSTER";

/// The webhook envelope sent to a subscriber. A future `1.2` must be
/// additive; consumers must ignore unknown fields.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub event_type: &'static str,
    pub day: String,
    pub entity_type: String,
    pub entity_id: String,
    pub cluster_id: String,
    pub cluster_severity: String,
    pub confidence_score: f64,
    pub confidence_band: String,
    pub cluster_summary: String,
    pub top_drivers: Value,
    pub impact: Value,
    pub followups: Value,
    pub data_quality: Value,
    pub payload_version: &'static str,
    pub sent_at: String,
    pub idempotency_key: String,
}

/// `sha1(subscription_id + "|" + cluster_id + "|" + day_iso)`.
pub fn idempotency_key(subscription_id: Uuid, cluster_id: &str, day_iso: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(subscription_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(cluster_id.as_bytes());
    hasher.update(b"|");
    hasher.update(day_iso.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds the payload for one `(subscription, candidate)` pair.
///
/// `top_drivers`, `impact`, `followups` and `data_quality` are pulled from the
/// signal's `metadata` JSON; a subscriber-facing payload only ever carries the
/// first driver.
pub fn build(subscription_id: Uuid, candidate: &Candidate, sent_at: DateTime<Utc>) -> WebhookPayload {
    let day_iso = candidate.day.to_string();
    let metadata = &candidate.signal.metadata;
    let top_driver = metadata
        .get("drivers")
        .and_then(|d| d.as_array())
        .and_then(|drivers| drivers.first())
        .cloned()
        .unwrap_or(Value::Null);
    let impact = metadata.get("impact").cloned().unwrap_or(Value::Array(vec![]));
    let followups = metadata
        .get("recommended_followups")
        .cloned()
        .unwrap_or(Value::Array(vec![]));
    let data_quality = metadata.get("data_quality").cloned().unwrap_or(Value::Null);

    WebhookPayload {
        event_type: EVENT_TYPE,
        day: day_iso.clone(),
        entity_type: candidate.entity_type.clone(),
        entity_id: candidate.entity_id.clone(),
        cluster_id: candidate.cluster_id.clone(),
        cluster_severity: candidate.cluster_severity.to_string(),
        confidence_score: candidate.confidence_score,
        confidence_band: candidate.confidence_band.clone(),
        cluster_summary: candidate.signal.cluster_summary.clone(),
        top_drivers: top_driver,
        impact,
        followups,
        data_quality,
        payload_version: PAYLOAD_VERSION,
        sent_at: sent_at.to_rfc3339(),
        idempotency_key: idempotency_key(subscription_id, &candidate.cluster_id, &day_iso),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_is_deterministic_for_fixed_inputs() {
        let sub = Uuid::from_u128(1);
        let a = idempotency_key(sub, "PORT_DISRUPTION:p:2026-01-01", "2026-01-01");
        let b = idempotency_key(sub, "PORT_DISRUPTION:p:2026-01-01", "2026-01-01");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn idempotency_key_differs_by_subscription() {
        let a = idempotency_key(Uuid::from_u128(1), "c", "2026-01-01");
        let b = idempotency_key(Uuid::from_u128(2), "c", "2026-01-01");
        assert_ne!(a, b);
    }
}
