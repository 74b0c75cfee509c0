//! Per-recipient delivery log.
//!
//! Records the outcome of every (recipient, channel) attempt made during a
//! dispatch. Contains recipient PII and can be cleared on an erasure request;
//! the aggregate counters live on [`crate::entity::alert`].

use sea_orm::entity::prelude::*;
use serde::Serialize;
use time::OffsetDateTime;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[sea_orm(table_name = "notification_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub donor_email: String,
    pub channel: String, // "email" or "sms"
    pub success: bool,
    pub error: Option<String>,
    pub sent_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
