use async_trait::async_trait;
use chrono::Utc;
use entity::{vessel_positions, vessels};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::message::AisMessage;
use super::simulation::{VesselRoster, VesselSeed};

/// Persists a batch of normalized AIS messages: one append-only row per message in
/// `vessel_positions`, and a `vessels` row created on first sighting of a new MMSI.
pub async fn persist_batch(db: &DatabaseConnection, messages: &[AisMessage]) -> anyhow::Result<()> {
    if messages.is_empty() {
        return Ok(());
    }

    let now = Utc::now();

    let vessel_models: Vec<vessels::ActiveModel> = {
        let mut seen = std::collections::HashSet::new();
        messages
            .iter()
            .filter(|m| seen.insert(m.mmsi.clone()))
            .map(|m| vessels::ActiveModel {
                mmsi: Set(m.mmsi.clone()),
                imo: Set(None),
                name: Set(None),
                flag: Set(None),
                vessel_type: Set(None),
                deadweight: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            })
            .collect()
    };
    vessels::Entity::insert_many(vessel_models)
        .on_conflict(OnConflict::column(vessels::Column::Mmsi).do_nothing().to_owned())
        .exec(db)
        .await?;

    let position_models: Vec<vessel_positions::ActiveModel> = messages
        .iter()
        .map(|m| vessel_positions::ActiveModel {
            id: sea_orm::ActiveValue::NotSet,
            vessel_mmsi: Set(m.mmsi.clone()),
            timestamp_utc: Set(m.timestamp_utc),
            lat: Set(m.lat),
            lon: Set(m.lon),
            sog: Set(m.sog),
            cog: Set(m.cog),
            nav_status: Set(m.nav_status.as_str().to_string()),
            destination: Set(m.destination.clone()),
            eta: Set(m.eta),
            created_at: Set(now),
        })
        .collect();
    vessel_positions::Entity::insert_many(position_models)
        .exec(db)
        .await?;

    Ok(())
}

/// Supplies the simulator with every vessel that has at least one persisted position,
/// seeded at its most recent known location.
pub struct DbVesselRoster {
    db: DatabaseConnection,
}

impl DbVesselRoster {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VesselRoster for DbVesselRoster {
    async fn known_vessels(&self) -> anyhow::Result<Vec<VesselSeed>> {
        let vessels = vessels::Entity::find().all(&self.db).await?;
        let mut seeds = Vec::with_capacity(vessels.len());
        for vessel in vessels {
            let latest = vessel_positions::Entity::find()
                .filter(vessel_positions::Column::VesselMmsi.eq(vessel.mmsi.clone()))
                .order_by_desc(vessel_positions::Column::TimestampUtc)
                .limit(1)
                .one(&self.db)
                .await?;
            if let Some(position) = latest {
                seeds.push(VesselSeed {
                    mmsi: vessel.mmsi,
                    lat: position.lat,
                    lon: position.lon,
                });
            }
        }
        Ok(seeds)
    }
}
