//! The run orchestrator: one invocation evaluates every enabled subscription for a
//! tenant against the current candidates and attempts delivery.

use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::alert::{candidate, dedupe, rate_limit::RateLimiter, repository as alert_repository};
use crate::delivery::{dlq, email, payload, repository as delivery_repository, send_webhook};
use crate::metrics;
use crate::settings::AlertingSettings;
use crate::types::{Channel, Scope, Severity};

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub candidates_total: u32,
    pub subscriptions: u32,
    pub matched_total: u32,
    pub sent_total: u32,
    pub skipped_dedupe_total: u32,
    pub skipped_rate_limit_total: u32,
    pub failed_total: u32,
}

/// Runs one dispatcher invocation for `tenant_id` (optionally scoped to
/// `user_id`), returning the finished run's id and summary.
pub async fn run(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    user_id: Option<Uuid>,
    settings: &AlertingSettings,
) -> anyhow::Result<(Uuid, RunSummary)> {
    let started_at = Utc::now();
    let run_id = alert_repository::start_run(db, tenant_id, user_id, started_at).await?;

    let mut summary = RunSummary::default();
    let mut first_error: Option<String> = None;
    let mut rate_limiter = RateLimiter::new(settings.rate_limit_per_endpoint);

    let subscriptions = alert_repository::enabled_subscriptions(db, tenant_id, user_id).await?;
    summary.subscriptions = subscriptions.len() as u32;

    let client = reqwest::Client::new();

    for subscription in &subscriptions {
        let scope: Scope = match subscription.scope.parse() {
            Ok(scope) => scope,
            Err(err) => {
                first_error.get_or_insert_with(|| err.to_string());
                continue;
            }
        };
        let severity_min: Severity = match subscription.severity_min.parse() {
            Ok(severity) => severity,
            Err(err) => {
                first_error.get_or_insert_with(|| err.to_string());
                continue;
            }
        };

        let filter = candidate::CandidateFilter {
            day: None,
            entity_type: match scope {
                Scope::Port => subscription.entity_type.clone(),
                Scope::Global => None,
            },
            entity_id: match scope {
                Scope::Port => subscription.entity_id.clone(),
                Scope::Global => None,
            },
            severity_min: Some(severity_min),
        };

        let candidates = candidate::select_candidates(db, &filter).await?;
        summary.candidates_total += candidates.len() as u32;

        for candidate in &candidates {
            if let Some(confidence_min) = subscription.confidence_min {
                if candidate.confidence_score < confidence_min {
                    continue;
                }
            }
            summary.matched_total += 1;

            if !rate_limiter.try_consume(subscription.id) {
                summary.skipped_rate_limit_total += 1;
                metrics::ALERTS_SKIPPED_RATE_LIMIT.inc();
                delivery_repository::create_pending(
                    db,
                    run_id,
                    subscription.id,
                    &candidate.cluster_id,
                    "SKIPPED_RATE_LIMIT",
                    started_at,
                )
                .await?;
                continue;
            }

            let should_send = dedupe::should_send_alert(
                db,
                tenant_id,
                &candidate.cluster_id,
                &subscription.channel,
                &subscription.endpoint,
                Utc::now(),
            )
            .await?;
            if !should_send {
                summary.skipped_dedupe_total += 1;
                metrics::ALERTS_SKIPPED_DEDUPE.inc();
                delivery_repository::create_pending(
                    db,
                    run_id,
                    subscription.id,
                    &candidate.cluster_id,
                    "SKIPPED_DEDUPE",
                    started_at,
                )
                .await?;
                continue;
            }

            let delivery_id = delivery_repository::create_pending(
                db,
                run_id,
                subscription.id,
                &candidate.cluster_id,
                "PENDING",
                started_at,
            )
            .await?;

            let channel: Channel = match subscription.channel.parse() {
                Ok(channel) => channel,
                Err(err) => {
                    first_error.get_or_insert_with(|| err.to_string());
                    summary.failed_total += 1;
                    metrics::ALERTS_FAILED.inc();
                    continue;
                }
            };

            let delivered = match channel {
                Channel::Webhook => {
                    let built = payload::build(subscription.id, candidate, Utc::now());
                    let outcome = send_webhook(
                        &client,
                        &subscription.endpoint,
                        subscription.secret.as_deref(),
                        &built.idempotency_key,
                        &built,
                        settings.webhook_retry_attempts,
                        std::time::Duration::from_millis(settings.webhook_timeout_ms),
                    )
                    .await;
                    match outcome {
                        Ok(outcome) => {
                            delivery_repository::record_webhook_attempts(db, delivery_id, &outcome.attempt_logs, Utc::now())
                                .await?;
                            delivery_repository::mark_sent(db, delivery_id, &outcome, Utc::now()).await?;
                            true
                        }
                        Err(err) => {
                            delivery_repository::record_webhook_attempts(db, delivery_id, &err.attempt_logs, Utc::now())
                                .await?;
                            dlq::record_failure(db, delivery_id, settings.dlq_max_attempts, &err.to_string(), Utc::now())
                                .await?;
                            delivery_repository::mark_failed(db, delivery_id, &err).await?;
                            false
                        }
                    }
                }
                Channel::Email => {
                    let subject = email::render_subject(candidate);
                    let body = email::render_body(candidate, None);
                    match email::send_email(&subscription.endpoint, &subject, &body).await {
                        Ok(()) => {
                            delivery_repository::mark_sent(
                                db,
                                delivery_id,
                                &crate::delivery::SendOutcome {
                                    attempts: 1,
                                    last_http_status: None,
                                    total_latency_ms: 0,
                                    attempt_logs: vec![],
                                },
                                Utc::now(),
                            )
                            .await?;
                            true
                        }
                        Err(err) => {
                            first_error.get_or_insert_with(|| err.to_string());
                            delivery_repository::mark_failed_message(db, delivery_id, &err.to_string()).await?;
                            false
                        }
                    }
                }
            };

            if delivered {
                summary.sent_total += 1;
                metrics::ALERTS_SENT.inc();
                dedupe::mark_alert_sent(
                    db,
                    tenant_id,
                    &candidate.cluster_id,
                    &subscription.channel,
                    &subscription.endpoint,
                    settings.dedupe_ttl_hours,
                    Utc::now(),
                )
                .await?;
            } else {
                summary.failed_total += 1;
                metrics::ALERTS_FAILED.inc();
            }
        }
    }

    let status = if first_error.is_some() || summary.failed_total > 0 {
        "FAILED"
    } else {
        "SUCCESS"
    };
    let finished_at = Utc::now();
    alert_repository::finish_run(db, run_id, status, summary.as_json(), first_error, finished_at).await?;

    Ok((run_id, summary))
}

impl RunSummary {
    fn as_json(&self) -> serde_json::Value {
        serde_json::to_value(self).expect("RunSummary always serializes")
    }
}

/// Drains due `alert_dlq` rows, retrying their webhook delivery and either
/// clearing the row on success or rescheduling/terminating it.
pub async fn drain_dlq(db: &DatabaseConnection, settings: &AlertingSettings, batch_size: u64) -> anyhow::Result<u32> {
    let now = Utc::now();
    let due = dlq::due_for_redrain(db, now, batch_size).await?;
    let client = reqwest::Client::new();
    let mut redrained = 0u32;

    for row in due {
        let Some(delivery) = delivery_repository::find(db, row.delivery_id).await? else {
            dlq::clear(db, row.delivery_id).await?;
            continue;
        };
        let subscription = match entity::alert_subscriptions::Entity::find_by_id(delivery.subscription_id)
            .one(db)
            .await?
        {
            Some(subscription) => subscription,
            None => {
                dlq::clear(db, row.delivery_id).await?;
                continue;
            }
        };
        let Some(candidate) = candidate::find_by_cluster_id(db, &delivery.cluster_id).await? else {
            delivery_repository::mark_failed_message(db, row.delivery_id, "cluster no longer available for re-send")
                .await?;
            dlq::clear(db, row.delivery_id).await?;
            continue;
        };

        let built = payload::build(subscription.id, &candidate, Utc::now());
        let outcome = send_webhook(
            &client,
            &subscription.endpoint,
            subscription.secret.as_deref(),
            &built.idempotency_key,
            &built,
            settings.webhook_retry_attempts,
            std::time::Duration::from_millis(settings.webhook_timeout_ms),
        )
        .await;
        redrained += 1;

        match outcome {
            Ok(outcome) => {
                delivery_repository::record_webhook_attempts(db, row.delivery_id, &outcome.attempt_logs, Utc::now()).await?;
                delivery_repository::mark_sent(db, row.delivery_id, &outcome, Utc::now()).await?;
                dlq::clear(db, row.delivery_id).await?;
            }
            Err(err) => {
                delivery_repository::record_webhook_attempts(db, row.delivery_id, &err.attempt_logs, Utc::now()).await?;
                dlq::record_failure(db, row.delivery_id, settings.dlq_max_attempts, &err.to_string(), now).await?;
                delivery_repository::mark_failed(db, row.delivery_id, &err).await?;
            }
        }
    }

    Ok(redrained)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_defaults_are_all_zero() {
        let summary = RunSummary::default();
        assert_eq!(summary.candidates_total, 0);
        assert_eq!(summary.sent_total, 0);
    }
}
