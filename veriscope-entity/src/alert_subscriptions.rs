//! A tenant/user's subscription to alerts for a port or globally, over a channel.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "alert_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub scope: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub severity_min: String,
    pub confidence_min: Option<f64>,
    pub channel: String,
    pub endpoint: String,
    pub secret: Option<String>,
    pub signature_version: String,
    pub is_enabled: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
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
