//! Append-only audit log of triggered emergency alerts.
//!
//! One row per dispatch, recording the criteria and the final per-channel
//! counters. Rows are never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "alert")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub blood_group: String,
    pub pincode: String,
    pub contact_phone: String,
    pub triggered_by: i32,
    pub used_fallback: bool,
    pub matched_count: i32,
    pub email_sent: i32,
    pub email_failed: i32,
    pub sms_sent: i32,
    pub sms_failed: i32,
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
