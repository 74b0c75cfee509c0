//! Responses recorded when a notified donor follows the link in an alert.
//!
//! Append-only: repeated clicks create distinct rows. Responses are a log,
//! not a toggle.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "donor_response")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub donor_id: i32,
    pub blood_group_acknowledged: String,
    pub responded_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
