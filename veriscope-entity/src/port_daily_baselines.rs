//! One row per `(port_id, day_utc)`: today's aggregates plus trailing 30-day moments.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "port_daily_baselines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub port_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub day: Date,
    pub arrivals: i32,
    pub departures: i32,
    pub unique_vessels: i32,
    pub avg_dwell_hours: Option<f64>,
    pub open_calls: i32,
    pub arrivals_30d_avg: Option<f64>,
    pub arrivals_30d_std: Option<f64>,
    pub dwell_30d_avg: Option<f64>,
    pub dwell_30d_std: Option<f64>,
    pub open_calls_30d_avg: Option<f64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
