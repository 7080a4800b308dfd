//! One row per dispatcher invocation, holding summary counters and error detail.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub status: String,
    pub started_at: DateTimeUtc,
    pub finished_at: Option<DateTimeUtc>,
    pub summary: Json,
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::alert_deliveries::Entity")]
    AlertDeliveries,
}

impl Related<super::alert_deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertDeliveries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
