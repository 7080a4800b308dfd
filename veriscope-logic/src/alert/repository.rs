use chrono::{DateTime, Utc};
use entity::{alert_runs, alert_subscriptions};
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde_json::Value;
use uuid::Uuid;

/// Enabled subscriptions for a tenant, optionally restricted to one user
///.
pub async fn enabled_subscriptions(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    user_id: Option<Uuid>,
) -> anyhow::Result<Vec<alert_subscriptions::Model>> {
    let mut query = alert_subscriptions::Entity::find()
        .filter(alert_subscriptions::Column::TenantId.eq(tenant_id))
        .filter(alert_subscriptions::Column::IsEnabled.eq(true));
    if let Some(user_id) = user_id {
        query = query.filter(alert_subscriptions::Column::UserId.eq(user_id));
    }
    Ok(query.all(db).await?)
}

/// Inserts the `alert_runs` row at the start of a dispatcher invocation
///, optimistically `SUCCESS` until proven otherwise.
pub async fn start_run(
    db: &DatabaseConnection,
    tenant_id: Uuid,
    user_id: Option<Uuid>,
    started_at: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let model = alert_runs::ActiveModel {
        id: Set(id),
        tenant_id: Set(tenant_id),
        user_id: Set(user_id),
        status: Set("SUCCESS".to_string()),
        started_at: Set(started_at),
        finished_at: Set(None),
        summary: Set(Value::Null),
        error: Set(None),
    };
    alert_runs::Entity::insert(model).exec(db).await?;
    Ok(id)
}

/// Finalizes an `alert_runs` row with the dispatcher's summary counters
///.
pub async fn finish_run(
    db: &DatabaseConnection,
    run_id: Uuid,
    status: &str,
    summary: Value,
    error: Option<String>,
    finished_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let model = alert_runs::ActiveModel {
        id: Set(run_id),
        status: Set(status.to_string()),
        finished_at: Set(Some(finished_at)),
        summary: Set(summary),
        error: Set(error),
        ..Default::default()
    };
    alert_runs::Entity::update(model)
        .filter(alert_runs::Column::Id.eq(run_id))
        .exec(db)
        .await?;
    Ok(())
}
