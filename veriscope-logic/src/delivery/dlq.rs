use chrono::{DateTime, Duration as ChronoDuration, Utc};
use entity::alert_dlq;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::metrics;

/// `{1→5min, 2→15min, 3→1h, 4→6h, ≥5→12h}`.
pub fn backoff(attempt_count: u32) -> ChronoDuration {
    match attempt_count {
        0 | 1 => ChronoDuration::minutes(5),
        2 => ChronoDuration::minutes(15),
        3 => ChronoDuration::hours(1),
        4 => ChronoDuration::hours(6),
        _ => ChronoDuration::hours(12),
    }
}

/// Inserts or updates the DLQ row for a failed delivery: in-call
/// webhook retries are one logical delivery attempt from the DLQ's point of view,
/// so `attempt_count` increments once per call to this function, never once per
/// physical HTTP POST.
pub async fn record_failure(
    db: &DatabaseConnection,
    delivery_id: Uuid,
    max_attempts: u32,
    last_error: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<u32> {
    let existing = find_by_delivery(db, delivery_id).await?;
    let next_attempt_count = existing.as_ref().map(|e| e.attempt_count as u32 + 1).unwrap_or(1);
    let next_attempt_at = if next_attempt_count >= max_attempts {
        // terminal: push far into the future so the drainer never picks it up again
        now + ChronoDuration::days(365 * 10)
    } else {
        now + backoff(next_attempt_count)
    };

    let model = alert_dlq::ActiveModel {
        id: Set(existing.as_ref().map(|e| e.id).unwrap_or_else(Uuid::new_v4)),
        delivery_id: Set(delivery_id),
        next_attempt_at: Set(next_attempt_at),
        attempt_count: Set(next_attempt_count as i32),
        max_attempts: Set(max_attempts as i32),
        last_error: Set(Some(last_error.to_string())),
        created_at: Set(existing.as_ref().map(|e| e.created_at).unwrap_or(now)),
        updated_at: Set(now),
    };
    alert_dlq::Entity::insert(model)
        .on_conflict(
            OnConflict::column(alert_dlq::Column::DeliveryId)
                .update_columns([
                    alert_dlq::Column::NextAttemptAt,
                    alert_dlq::Column::AttemptCount,
                    alert_dlq::Column::LastError,
                    alert_dlq::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    metrics::DLQ_DEPTH.inc();
    Ok(next_attempt_count)
}

/// Removes the DLQ row once a re-drained delivery finally succeeds.
pub async fn clear(db: &DatabaseConnection, delivery_id: Uuid) -> anyhow::Result<()> {
    let existing = find_by_delivery(db, delivery_id).await?;
    if let Some(row) = existing {
        alert_dlq::Entity::delete_by_id(row.id).exec(db).await?;
        metrics::DLQ_DEPTH.dec();
    }
    Ok(())
}

/// Rows whose `next_attempt_at <= now`, ordered by `next_attempt_at` ascending,
/// limited to `batch_size`.
pub async fn due_for_redrain(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    batch_size: u64,
) -> anyhow::Result<Vec<alert_dlq::Model>> {
    Ok(alert_dlq::Entity::find()
        .filter(alert_dlq::Column::NextAttemptAt.lte(now))
        .order_by(alert_dlq::Column::NextAttemptAt, Order::Asc)
        .limit(batch_size)
        .all(db)
        .await?)
}

/// Marks the owning delivery `FAILED` terminal once `attempt_count >= max_attempts`.
pub fn is_terminal(row: &alert_dlq::Model) -> bool {
    row.attempt_count >= row.max_attempts
}

async fn find_by_delivery(db: &DatabaseConnection, delivery_id: Uuid) -> anyhow::Result<Option<alert_dlq::Model>> {
    Ok(alert_dlq::Entity::find()
        .filter(alert_dlq::Column::DeliveryId.eq(delivery_id))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_schedule_matches_spec_table() {
        assert_eq!(backoff(1), ChronoDuration::minutes(5));
        assert_eq!(backoff(2), ChronoDuration::minutes(15));
        assert_eq!(backoff(3), ChronoDuration::hours(1));
        assert_eq!(backoff(4), ChronoDuration::hours(6));
        assert_eq!(backoff(5), ChronoDuration::hours(12));
        assert_eq!(backoff(20), ChronoDuration::hours(12));
    }

    #[test]
    fn terminal_check_matches_max_attempts() {
        let row = alert_dlq::Model {
            id: Uuid::new_v4(),
            delivery_id: Uuid::new_v4(),
            next_attempt_at: Utc::now(),
            attempt_count: 10,
            max_attempts: 10,
            last_error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(is_terminal(&row));
    }
}
