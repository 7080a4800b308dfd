//! One row per physical HTTP attempt. `attempt_no` keeps increasing across DLQ re-drains.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_delivery_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub attempt_no: i32,
    pub status: String,
    pub http_status: Option<i32>,
    pub latency_ms: Option<i32>,
    pub error: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::alert_deliveries::Entity",
        from = "Column::DeliveryId",
        to = "super::alert_deliveries::Column::Id"
    )]
    AlertDelivery,
}

impl Related<super::alert_deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertDelivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
