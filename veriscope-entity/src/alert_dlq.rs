//! One row per failed delivery awaiting re-drain. Unique on `delivery_id`, cascades on delete.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_dlq")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub delivery_id: Uuid,
    pub next_attempt_at: DateTimeUtc,
    pub attempt_count: i32,
    pub max_attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::alert_deliveries::Entity",
        from = "Column::DeliveryId",
        to = "super::alert_deliveries::Column::Id",
        on_delete = "Cascade"
    )]
    AlertDelivery,
}

impl Related<super::alert_deliveries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertDelivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
