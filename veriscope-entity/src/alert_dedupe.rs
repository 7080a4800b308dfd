//! Single row per `(tenant_id, cluster_id, channel, endpoint)`, upserted on send.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "alert_dedupe")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub cluster_id: String,
    pub channel: String,
    pub endpoint: String,
    pub last_sent_at: DateTimeUtc,
    pub ttl_hours: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
