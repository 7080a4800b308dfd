//! Append-only vessel position time series. For a given vessel, newest row wins.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vessel_positions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub vessel_mmsi: String,
    pub timestamp_utc: DateTimeUtc,
    pub lat: f64,
    pub lon: f64,
    pub sog: Option<f64>,
    pub cog: Option<f64>,
    pub nav_status: String,
    pub destination: Option<String>,
    pub eta: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
