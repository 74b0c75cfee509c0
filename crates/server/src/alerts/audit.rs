//! Append-only dispatch and delivery bookkeeping.
//!
//! Writes are best-effort by contract: the dispatcher logs failures and
//! carries on, so nothing here may block or fail a user-facing dispatch.

use crate::alerts::dispatch::{AlertCriteria, AlertResult, DeliveryOutcome};
use crate::entity::{alert, notification_log};
use crate::error::AuditError;
use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use std::sync::Arc;
use time::OffsetDateTime;

#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one row per completed dispatch with its final counters.
    async fn record_dispatch(
        &self,
        criteria: &AlertCriteria,
        result: &AlertResult,
    ) -> Result<(), AuditError>;

    /// Append one row per (recipient, channel) attempt.
    async fn record_delivery(&self, outcome: &DeliveryOutcome) -> Result<(), AuditError>;
}

pub struct SeaOrmAuditLog {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmAuditLog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditLog for SeaOrmAuditLog {
    #[tracing::instrument(skip_all)]
    async fn record_dispatch(
        &self,
        criteria: &AlertCriteria,
        result: &AlertResult,
    ) -> Result<(), AuditError> {
        let entry = alert::ActiveModel {
            id: ActiveValue::NotSet,
            blood_group: ActiveValue::Set(criteria.blood_group.to_string()),
            pincode: ActiveValue::Set(criteria.pincode.clone()),
            contact_phone: ActiveValue::Set(criteria.contact_phone.clone()),
            triggered_by: ActiveValue::Set(criteria.triggered_by),
            used_fallback: ActiveValue::Set(result.used_fallback),
            matched_count: ActiveValue::Set(result.matched_recipients.len() as i32),
            email_sent: ActiveValue::Set(result.email_sent as i32),
            email_failed: ActiveValue::Set(result.email_failed as i32),
            sms_sent: ActiveValue::Set(result.sms_sent as i32),
            sms_failed: ActiveValue::Set(result.sms_failed as i32),
            created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };
        entry.insert(self.db.as_ref()).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn record_delivery(&self, outcome: &DeliveryOutcome) -> Result<(), AuditError> {
        let entry = notification_log::ActiveModel {
            id: ActiveValue::NotSet,
            donor_email: ActiveValue::Set(outcome.recipient_email.clone()),
            channel: ActiveValue::Set(outcome.channel.as_str().to_string()),
            success: ActiveValue::Set(outcome.success()),
            error: ActiveValue::Set(outcome.error.as_ref().map(|e| e.to_string())),
            sent_at: ActiveValue::Set(OffsetDateTime::now_utc()),
        };
        entry.insert(self.db.as_ref()).await?;
        Ok(())
    }
}
