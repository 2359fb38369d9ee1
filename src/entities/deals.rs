//! SeaORM Entity for deals
//!
//! One row per accepted deal. Rows are only ever inserted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Client-supplied identifier, trimmed (unique, max 100 chars)
    #[sea_orm(unique)]
    pub deal_unique_id: String,
    /// ISO 4217 code, upper-cased
    pub from_currency: String,
    /// ISO 4217 code, upper-cased
    pub to_currency: String,
    pub deal_timestamp: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((20, 6)))")]
    pub amount: Decimal,
    /// Assigned at persist time
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
