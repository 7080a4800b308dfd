use std::time::{Duration, Instant};

use reqwest::Client;
use thiserror::Error;

use crate::metrics;

use super::payload::WebhookPayload;
use super::signing;

/// Delay before each of `WEBHOOK_RETRY_ATTEMPTS` attempts: no delay
/// before the first try, then 250ms, then 1000ms.
const RETRY_DELAYS_MS: &[u64] = &[0, 250, 1000];

#[derive(Debug, Clone)]
pub struct AttemptLog {
    pub attempt_no: u32,
    pub success: bool,
    pub http_status: Option<u16>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub attempts: u32,
    pub last_http_status: Option<u16>,
    pub total_latency_ms: u64,
    pub attempt_logs: Vec<AttemptLog>,
}

#[derive(Debug, Error)]
#[error("webhook delivery failed after {attempts} attempt(s), last status {last_status:?}")]
pub struct WebhookSendError {
    pub attempts: u32,
    pub last_status: Option<u16>,
    pub attempt_logs: Vec<AttemptLog>,
}

/// POSTs `payload` to `endpoint`, signing it if `secret` is set, retrying up to
/// `retry_attempts` times with the fixed backoff schedule and a per-attempt
/// `timeout`. Succeeds on the first 2xx response; otherwise returns
/// every attempt's log in the error so the caller can persist them.
pub async fn send_webhook(
    client: &Client,
    endpoint: &str,
    secret: Option<&str>,
    idempotency_key: &str,
    payload: &WebhookPayload,
    retry_attempts: u32,
    timeout: Duration,
) -> Result<SendOutcome, WebhookSendError> {
    let body = serde_json::to_string(payload).expect("WebhookPayload always serializes");
    let mut logs = Vec::with_capacity(retry_attempts as usize);
    let mut last_status = None;

    for attempt in 1..=retry_attempts {
        let delay_idx = (attempt - 1) as usize;
        if let Some(&delay_ms) = RETRY_DELAYS_MS.get(delay_idx) {
            if delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }

        let started = Instant::now();
        metrics::WEBHOOK_ATTEMPTS.inc();

        let timestamp = chrono::Utc::now().timestamp();
        let mut request = client
            .post(endpoint)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .header("Idempotency-Key", idempotency_key)
            .body(body.clone());
        if let Some(sig) = signing::sign(secret, timestamp, &body) {
            request = request
                .header(signing::TIMESTAMP_HEADER, timestamp.to_string())
                .header(signing::SIGNATURE_HEADER, sig);
        }

        let result = request.send().await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let status = response.status();
                last_status = Some(status.as_u16());
                let success = status.is_success();
                logs.push(AttemptLog {
                    attempt_no: attempt,
                    success,
                    http_status: Some(status.as_u16()),
                    latency_ms,
                    error: if success {
                        None
                    } else {
                        Some(format!("non-2xx status {status}"))
                    },
                });
                if success {
                    return Ok(SendOutcome {
                        attempts: attempt,
                        last_http_status: last_status,
                        total_latency_ms: logs.iter().map(|l| l.latency_ms).sum(),
                        attempt_logs: logs,
                    });
                }
            }
            Err(err) => {
                logs.push(AttemptLog {
                    attempt_no: attempt,
                    success: false,
                    http_status: None,
                    latency_ms,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    Err(WebhookSendError {
        attempts: retry_attempts,
        last_status,
        attempt_logs: logs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Candidate;
    use crate::delivery::payload;
    use crate::types::Severity;
    use entity::signals;
    use uuid::Uuid;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_candidate() -> Candidate {
        let signal = signals::Model {
            id: Uuid::new_v4(),
            signal_type: "PORT_ARRIVALS_ANOMALY".to_string(),
            entity_type: "PORT".to_string(),
            entity_id: Uuid::new_v4().to_string(),
            day: chrono::Utc::now().date_naive(),
            severity: "HIGH".to_string(),
            value: 25.0,
            baseline: 5.0,
            stddev: Some(1.0),
            zscore: Some(20.0),
            delta_pct: Some(400.0),
            confidence_score: 0.9,
            confidence_band: "HIGH".to_string(),
            method: "zscore_30d".to_string(),
            cluster_id: "PORT_DISRUPTION:p:2026-01-01".to_string(),
            cluster_key: "p:2026-01-01".to_string(),
            cluster_type: "PORT_DISRUPTION".to_string(),
            cluster_severity: "HIGH".to_string(),
            cluster_summary: "Arrivals +400.0%".to_string(),
            explanation: "explanation".to_string(),
            metadata: serde_json::json!({"drivers": [], "impact": [], "recommended_followups": [], "data_quality": {}}),
            created_at: chrono::Utc::now(),
        };
        Candidate {
            cluster_id: signal.cluster_id.clone(),
            cluster_severity: Severity::High,
            confidence_score: signal.confidence_score,
            confidence_band: signal.confidence_band.clone(),
            day: signal.day,
            entity_type: signal.entity_type.clone(),
            entity_id: signal.entity_id.clone(),
            entity_name: signal.entity_id.clone(),
            signal,
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt_with_a_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = Client::new();
        let candidate = sample_candidate();
        let payload = payload::build(Uuid::new_v4(), &candidate, chrono::Utc::now());
        let outcome = send_webhook(
            &client,
            &format!("{}/hook", server.uri()),
            None,
            "idem-key",
            &payload,
            3,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.last_http_status, Some(200));
    }

    #[tokio::test]
    async fn retries_once_then_succeeds_spec_scenario_7() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = Client::new();
        let candidate = sample_candidate();
        let payload = payload::build(Uuid::new_v4(), &candidate, chrono::Utc::now());
        let outcome = send_webhook(
            &client,
            &format!("{}/hook", server.uri()),
            None,
            "idem-key",
            &payload,
            3,
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.last_http_status, Some(200));
    }

    #[tokio::test]
    async fn exhausts_retries_and_returns_typed_error_spec_scenario_5() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = Client::new();
        let candidate = sample_candidate();
        let payload = payload::build(Uuid::new_v4(), &candidate, chrono::Utc::now());
        let err = send_webhook(
            &client,
            &format!("{}/hook", server.uri()),
            None,
            "idem-key",
            &payload,
            3,
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_status, Some(500));
        assert_eq!(err.attempt_logs.len(), 3);
    }

    #[tokio::test]
    async fn signs_request_when_subscription_has_a_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = Client::new();
        let candidate = sample_candidate();
        let payload = payload::build(Uuid::new_v4(), &candidate, chrono::Utc::now());
        let outcome = send_webhook(
            &client,
            &format!("{}/hook", server.uri()),
            Some("secret"),
            "idem-key",
            &payload,
            3,
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(outcome.attempts, 1);
    }
}
