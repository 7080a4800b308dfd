//! Open or closed `[arrival_time, departure_time?)` interval for `(vessel, port)`.
//! At most one open call per vessel is enforced by a partial unique index in the migration.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "port_calls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vessel_mmsi: String,
    pub port_id: Uuid,
    pub call_type: String,
    pub status: String,
    pub arrival_time: DateTimeUtc,
    pub departure_time: Option<DateTimeUtc>,
    pub berth_time_hours: Option<f64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
