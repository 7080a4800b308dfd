use chrono::{DateTime, Utc};
use entity::alert_dedupe;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

/// Reads `alert_dedupe` for `(tenant, cluster_id, channel, endpoint)`; allows iff no
/// row exists or `now >= last_sent_at + ttl_hours`.
pub async fn should_send_alert(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    cluster_id: &str,
    channel: &str,
    endpoint: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let row = find(db, tenant_id, cluster_id, channel, endpoint).await?;
    Ok(match row {
        None => true,
        Some(row) => now >= row.last_sent_at + chrono::Duration::hours(row.ttl_hours as i64),
    })
}

/// Upserts the dedupe row's `last_sent_at` for `(tenant, cluster_id, channel, endpoint)`.
pub async fn mark_alert_sent(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    cluster_id: &str,
    channel: &str,
    endpoint: &str,
    ttl_hours: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let model = alert_dedupe::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        cluster_id: Set(cluster_id.to_string()),
        channel: Set(channel.to_string()),
        endpoint: Set(endpoint.to_string()),
        last_sent_at: Set(now),
        ttl_hours: Set(ttl_hours as i32),
    };
    alert_dedupe::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                alert_dedupe::Column::TenantId,
                alert_dedupe::Column::ClusterId,
                alert_dedupe::Column::Channel,
                alert_dedupe::Column::Endpoint,
            ])
            .update_columns([alert_dedupe::Column::LastSentAt, alert_dedupe::Column::TtlHours])
            .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

async fn find(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    cluster_id: &str,
    channel: &str,
    endpoint: &str,
) -> anyhow::Result<Option<alert_dedupe::Model>> {
    Ok(alert_dedupe::Entity::find()
        .filter(alert_dedupe::Column::TenantId.eq(tenant_id))
        .filter(alert_dedupe::Column::ClusterId.eq(cluster_id))
        .filter(alert_dedupe::Column::Channel.eq(channel))
        .filter(alert_dedupe::Column::Endpoint.eq(endpoint))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_window_math_matches_spec_scenario() {
        let t0 = Utc::now();
        let last_sent_at = t0;
        let ttl_hours = 24i64;

        let at_10h = t0 + chrono::Duration::hours(10);
        assert!(at_10h < last_sent_at + chrono::Duration::hours(ttl_hours));

        let at_26h = t0 + chrono::Duration::hours(26);
        assert!(at_26h >= last_sent_at + chrono::Duration::hours(ttl_hours));
    }
}
