//! One row per `(signal_type, entity_type, entity_id, day)`; the unique constraint
//! on that tuple is what makes signal evaluation idempotent.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "signals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub signal_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub day: Date,
    pub severity: String,
    pub value: f64,
    pub baseline: f64,
    pub stddev: Option<f64>,
    pub zscore: Option<f64>,
    pub delta_pct: Option<f64>,
    pub confidence_score: f64,
    pub confidence_band: String,
    pub method: String,
    pub cluster_id: String,
    pub cluster_key: String,
    pub cluster_type: String,
    pub cluster_severity: String,
    pub cluster_summary: String,
    pub explanation: String,
    pub metadata: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
