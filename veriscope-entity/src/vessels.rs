//! A vessel, identified by its 9-digit MMSI. Created on first sighting, never deleted.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vessels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mmsi: String,
    pub imo: Option<String>,
    pub name: Option<String>,
    pub flag: Option<String>,
    pub vessel_type: Option<String>,
    pub deadweight: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
