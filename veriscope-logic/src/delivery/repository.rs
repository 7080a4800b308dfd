use chrono::{DateTime, Utc};
use entity::{alert_delivery_attempts, alert_deliveries};
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::webhook::{AttemptLog, SendOutcome, WebhookSendError};

/// Creates the `alert_deliveries` row for a `(run, subscription, cluster)` with the
/// given starting `status`: `PENDING` before any send attempt,
/// or `SKIPPED_DEDUPE`/`SKIPPED_RATE_LIMIT` when the gate short-circuits the send.
pub async fn create_pending(
    db: &DatabaseConnection,
    run_id: Uuid,
    subscription_id: Uuid,
    cluster_id: &str,
    status: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let model = alert_deliveries::ActiveModel {
        id: Set(id),
        run_id: Set(run_id),
        subscription_id: Set(subscription_id),
        cluster_id: Set(cluster_id.to_string()),
        status: Set(status.to_string()),
        attempts: Set(0),
        last_http_status: Set(None),
        latency_ms: Set(None),
        sent_at: Set(None),
        error: Set(None),
        created_at: Set(now),
    };
    alert_deliveries::Entity::insert(model).exec(db).await?;
    Ok(id)
}

/// Next `attempt_no` for a delivery: attempts keep counting across DLQ
/// re-drains, so this reads the max of what's already stored rather than
/// trusting an in-memory counter.
pub async fn next_attempt_no(db: &DatabaseConnection, delivery_id: Uuid) -> anyhow::Result<i32> {
    let last = alert_delivery_attempts::Entity::find()
        .filter(alert_delivery_attempts::Column::DeliveryId.eq(delivery_id))
        .order_by_desc(alert_delivery_attempts::Column::AttemptNo)
        .one(db)
        .await?;
    Ok(last.map(|row| row.attempt_no + 1).unwrap_or(1))
}

/// Records one physical HTTP attempt.
pub async fn record_attempt(
    db: &DatabaseConnection,
    delivery_id: Uuid,
    attempt_no: i32,
    log: &AttemptLog,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let model = alert_delivery_attempts::ActiveModel {
        id: Set(Uuid::new_v4()),
        delivery_id: Set(delivery_id),
        attempt_no: Set(attempt_no),
        status: Set(if log.success { "SUCCESS".to_string() } else { "FAILED".to_string() }),
        http_status: Set(log.http_status.map(i32::from)),
        latency_ms: Set(Some(log.latency_ms as i32)),
        error: Set(log.error.clone()),
        created_at: Set(now),
    };
    alert_delivery_attempts::Entity::insert(model).exec(db).await?;
    Ok(())
}

/// Records every attempt log from a webhook send (success or exhausted retries)
/// and updates the owning `alert_deliveries` row's terminal state.
pub async fn record_webhook_attempts(
    db: &DatabaseConnection,
    delivery_id: Uuid,
    logs: &[AttemptLog],
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let mut attempt_no = next_attempt_no(db, delivery_id).await?;
    for log in logs {
        record_attempt(db, delivery_id, attempt_no, log, now).await?;
        attempt_no += 1;
    }
    Ok(())
}

/// Marks a delivery `SENT` after a successful webhook or email send.
pub async fn mark_sent(
    db: &DatabaseConnection,
    delivery_id: Uuid,
    outcome: &SendOutcome,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let model = alert_deliveries::ActiveModel {
        id: Set(delivery_id),
        status: Set("SENT".to_string()),
        attempts: Set(outcome.attempts as i32),
        last_http_status: Set(outcome.last_http_status.map(i32::from)),
        latency_ms: Set(Some(outcome.total_latency_ms as i32)),
        sent_at: Set(Some(now)),
        error: Set(None),
        ..Default::default()
    };
    alert_deliveries::Entity::update(model)
        .filter(alert_deliveries::Column::Id.eq(delivery_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Marks a delivery `FAILED` after its in-call retries were exhausted, whether or
/// not it still has DLQ budget left for a later re-drain — the DLQ, not the delivery
/// row, tracks whether a retry is still pending.
pub async fn mark_failed(db: &DatabaseConnection, delivery_id: Uuid, err: &WebhookSendError) -> anyhow::Result<()> {
    let last_error = err
        .attempt_logs
        .last()
        .and_then(|log| log.error.clone())
        .unwrap_or_else(|| "delivery failed".to_string());
    let model = alert_deliveries::ActiveModel {
        id: Set(delivery_id),
        status: Set("FAILED".to_string()),
        attempts: Set(err.attempts as i32),
        last_http_status: Set(err.last_status.map(i32::from)),
        error: Set(Some(last_error)),
        ..Default::default()
    };
    alert_deliveries::Entity::update(model)
        .filter(alert_deliveries::Column::Id.eq(delivery_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Marks a delivery `FAILED` from a plain error message, for channels (email)
/// that don't go through the webhook attempt machinery.
pub async fn mark_failed_message(db: &DatabaseConnection, delivery_id: Uuid, message: &str) -> anyhow::Result<()> {
    let model = alert_deliveries::ActiveModel {
        id: Set(delivery_id),
        status: Set("FAILED".to_string()),
        attempts: Set(1),
        error: Set(Some(message.to_string())),
        ..Default::default()
    };
    alert_deliveries::Entity::update(model)
        .filter(alert_deliveries::Column::Id.eq(delivery_id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn find(db: &DatabaseConnection, delivery_id: Uuid) -> anyhow::Result<Option<alert_deliveries::Model>> {
    Ok(alert_deliveries::Entity::find_by_id(delivery_id).one(db).await?)
}
