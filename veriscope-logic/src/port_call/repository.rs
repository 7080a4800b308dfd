use chrono::{DateTime, Utc};
use entity::{port_calls, ports, vessel_positions};
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::metrics;
use crate::types::PortCallStatus;

pub async fn load_ports(db: &DatabaseConnection) -> anyhow::Result<Vec<ports::Model>> {
    Ok(ports::Entity::find().all(db).await?)
}

/// `mmsi -> (port_call_id, port_id, arrival_time)` for every call still open.
pub async fn load_open_calls(
    db: &DatabaseConnection,
) -> anyhow::Result<std::collections::HashMap<String, (Uuid, Uuid, DateTime<Utc>)>> {
    let open = port_calls::Entity::find()
        .filter(port_calls::Column::Status.eq(PortCallStatus::InPort.as_str()))
        .all(db)
        .await?;
    Ok(open
        .into_iter()
        .map(|c| (c.vessel_mmsi, (c.id, c.port_id, c.arrival_time)))
        .collect())
}

/// The highest `vessel_positions.id` currently persisted, used as the detector's
/// starting watermark so a restart doesn't replay the full position history.
pub async fn max_position_id(db: &DatabaseConnection) -> anyhow::Result<i64> {
    let latest = vessel_positions::Entity::find()
        .order_by(vessel_positions::Column::Id, Order::Desc)
        .limit(1)
        .one(db)
        .await?;
    Ok(latest.map(|m| m.id).unwrap_or(0))
}

/// Positions with `id > since_id`, oldest first. The caller folds these down to the
/// newest position per vessel (append-only stream, ascending ids).
pub async fn positions_after(
    db: &DatabaseConnection,
    since_id: i64,
) -> anyhow::Result<Vec<vessel_positions::Model>> {
    Ok(vessel_positions::Entity::find()
        .filter(vessel_positions::Column::Id.gt(since_id))
        .order_by_asc(vessel_positions::Column::Id)
        .all(db)
        .await?)
}

pub async fn open_call(
    db: &DatabaseConnection,
    vessel_mmsi: &str,
    port_id: Uuid,
    arrival_time: DateTime<Utc>,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let model = port_calls::ActiveModel {
        id: Set(id),
        vessel_mmsi: Set(vessel_mmsi.to_string()),
        port_id: Set(port_id),
        call_type: Set("arrival".to_string()),
        status: Set(PortCallStatus::InPort.as_str().to_string()),
        arrival_time: Set(arrival_time),
        departure_time: Set(None),
        berth_time_hours: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    port_calls::Entity::insert(model).exec(db).await?;
    metrics::PORT_CALLS_OPENED.inc();
    Ok(id)
}

pub async fn close_call(
    db: &DatabaseConnection,
    call_id: Uuid,
    arrival_time: DateTime<Utc>,
    departure_time: DateTime<Utc>,
) -> anyhow::Result<()> {
    let berth_hours = (departure_time - arrival_time).num_seconds() as f64 / 3600.0;
    let model = port_calls::ActiveModel {
        id: Set(call_id),
        status: Set(PortCallStatus::Completed.as_str().to_string()),
        departure_time: Set(Some(departure_time)),
        berth_time_hours: Set(Some(berth_hours)),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };
    port_calls::Entity::update(model).exec(db).await?;
    metrics::PORT_CALLS_CLOSED.inc();
    Ok(())
}
