//! One row per `(run, subscription, cluster_id)`.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "alert_deliveries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub run_id: Uuid,
    pub subscription_id: Uuid,
    pub cluster_id: String,
    pub status: String,
    pub attempts: i32,
    pub last_http_status: Option<i32>,
    pub latency_ms: Option<i32>,
    pub sent_at: Option<DateTimeUtc>,
    pub error: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::alert_runs::Entity",
        from = "Column::RunId",
        to = "super::alert_runs::Column::Id"
    )]
    AlertRun,
    #[sea_orm(
        belongs_to = "super::alert_subscriptions::Entity",
        from = "Column::SubscriptionId",
        to = "super::alert_subscriptions::Column::Id"
    )]
    AlertSubscription,
    #[sea_orm(has_many = "super::alert_delivery_attempts::Entity")]
    AlertDeliveryAttempts,
    #[sea_orm(has_one = "super::alert_dlq::Entity")]
    AlertDlq,
}

impl Related<super::alert_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertRun.def()
    }
}

impl Related<super::alert_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertSubscription.def()
    }
}

impl Related<super::alert_delivery_attempts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertDeliveryAttempts.def()
    }
}

impl Related<super::alert_dlq::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AlertDlq.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
