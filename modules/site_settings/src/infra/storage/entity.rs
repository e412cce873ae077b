//! SeaORM entity for the site settings table

use sea_orm::entity::prelude::*;

/// One row per settings document; the CMS uses a single `key`
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "site_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    /// Compare-and-swap counter, bumped on every write
    pub revision: i64,

    /// Serialized settings document
    #[sea_orm(column_type = "Text")]
    pub data: String,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
