//! Emergency alert dispatch orchestration.
//!
//! One dispatch: validate criteria, resolve the recipient pool (exact match,
//! then fallback to all donors), attempt delivery on both channels per
//! recipient, aggregate per-channel counters, append the audit row, and
//! publish the realtime event. Individual channel failures are folded into
//! the counters and never abort the loop.

use crate::alerts::audit::AuditLog;
use crate::alerts::channel::{Channel, NotificationChannel};
use crate::alerts::directory::DonorDirectory;
use crate::compatibility::BloodGroup;
use crate::error::{DeliveryError, DispatchError};
use crate::realtime::Broadcaster;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

/// What an alert asks for. Immutable once constructed.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AlertCriteria {
    pub blood_group: BloodGroup,
    /// Postal code of the region the blood is needed in.
    pub pincode: String,
    /// Phone number donors should call back.
    pub contact_phone: String,
    /// Id of the user who triggered the alert.
    pub triggered_by: i32,
}

impl AlertCriteria {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.pincode.trim().is_empty() {
            return Err(DispatchError::Validation("pincode must not be empty".into()));
        }
        if self.contact_phone.trim().is_empty() {
            return Err(DispatchError::Validation(
                "contact_phone must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// A donor contact eligible for notification in one dispatch. Read-only
/// projection of a donor row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct Recipient {
    pub email: String,
    pub phone: Option<String>,
}

/// Outcome of a single (recipient, channel) attempt. Never retried within
/// the same dispatch.
#[derive(Clone, Debug)]
pub struct DeliveryOutcome {
    pub channel: Channel,
    pub recipient_email: String,
    pub error: Option<DeliveryError>,
}

impl DeliveryOutcome {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// Final accounting for one dispatch, immutable once returned.
#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct AlertResult {
    pub matched_recipients: Vec<Recipient>,
    pub used_fallback: bool,
    pub email_sent: u32,
    pub email_failed: u32,
    pub sms_sent: u32,
    pub sms_failed: u32,
}

/// Orchestrates one emergency alert broadcast.
///
/// Channels are optional: a channel whose configuration block is absent is
/// disabled entirely, and its attempts are skipped rather than counted as
/// failures.
pub struct AlertDispatcher {
    directory: Arc<dyn DonorDirectory>,
    email: Option<Arc<dyn NotificationChannel>>,
    sms: Option<Arc<dyn NotificationChannel>>,
    audit: Arc<dyn AuditLog>,
    broadcaster: Arc<Broadcaster>,
}

impl AlertDispatcher {
    pub fn new(
        directory: Arc<dyn DonorDirectory>,
        email: Option<Arc<dyn NotificationChannel>>,
        sms: Option<Arc<dyn NotificationChannel>>,
        audit: Arc<dyn AuditLog>,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            directory,
            email,
            sms,
            audit,
            broadcaster,
        }
    }

    /// Run one dispatch to completion.
    ///
    /// Hard failures are invalid criteria, an empty donor pool, and a failing
    /// directory. A dispatch in which every single send failed is still a
    /// completed dispatch; the counters tell the story.
    #[tracing::instrument(skip(self, criteria), fields(blood_group = %criteria.blood_group, pincode = %criteria.pincode))]
    pub async fn dispatch(&self, criteria: AlertCriteria) -> Result<AlertResult, DispatchError> {
        criteria.validate()?;

        let matched = self
            .directory
            .find_matching(criteria.blood_group, &criteria.pincode)
            .await?;

        let (recipients, used_fallback) = if matched.is_empty() {
            tracing::info!(
                name = "alerts.dispatch.fallback",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                blood_group = %criteria.blood_group,
                pincode = %criteria.pincode,
                message = "No exact donor match, falling back to all donors"
            );
            (self.directory.all_contactable().await?, true)
        } else {
            (matched, false)
        };

        if recipients.is_empty() {
            return Err(DispatchError::NoRecipients);
        }

        let mut result = AlertResult {
            matched_recipients: recipients,
            used_fallback,
            ..Default::default()
        };

        for recipient in result.matched_recipients.clone() {
            if let Some(email) = &self.email {
                let outcome = self
                    .attempt(email.as_ref(), &recipient.email, &criteria)
                    .await;
                if outcome.success() {
                    result.email_sent += 1;
                } else {
                    result.email_failed += 1;
                }
                self.log_delivery(&outcome).await;
            }

            // SMS only when the donor has a phone number; a missing number is
            // a skip, not a failure.
            if let (Some(sms), Some(phone)) = (&self.sms, &recipient.phone) {
                let outcome = self.attempt(sms.as_ref(), phone, &criteria).await;
                let outcome = DeliveryOutcome {
                    recipient_email: recipient.email.clone(),
                    ..outcome
                };
                if outcome.success() {
                    result.sms_sent += 1;
                } else {
                    result.sms_failed += 1;
                }
                self.log_delivery(&outcome).await;
            }
        }

        // Audit is best-effort: a failed write never changes the user-facing
        // outcome of the dispatch.
        if let Err(e) = self.audit.record_dispatch(&criteria, &result).await {
            tracing::error!(
                name = "alerts.dispatch.audit_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to append alert audit record"
            );
        }

        // Fire-and-forget realtime fan-out to connected clients.
        self.broadcaster.broadcast(
            "emergency_alert",
            json!({
                "bloodType": criteria.blood_group.as_str(),
                "region": criteria.pincode,
            }),
        );

        tracing::info!(
            name = "alerts.dispatch.completed",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            recipients = result.matched_recipients.len(),
            used_fallback = result.used_fallback,
            email_sent = result.email_sent,
            email_failed = result.email_failed,
            sms_sent = result.sms_sent,
            sms_failed = result.sms_failed,
            message = "Emergency alert dispatch completed"
        );

        Ok(result)
    }

    /// One channel attempt. Errors are captured into the outcome, never
    /// propagated; a failure on one recipient must not abort the loop.
    async fn attempt(
        &self,
        channel: &dyn NotificationChannel,
        target: &str,
        criteria: &AlertCriteria,
    ) -> DeliveryOutcome {
        let error = match channel.send(target, criteria).await {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    name = "alerts.dispatch.send_failed",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    channel = channel.channel().as_str(),
                    transient = e.transient,
                    error = %e,
                    message = "Channel send failed"
                );
                Some(e)
            }
        };
        DeliveryOutcome {
            channel: channel.channel(),
            recipient_email: target.to_string(),
            error,
        }
    }

    async fn log_delivery(&self, outcome: &DeliveryOutcome) {
        if let Err(e) = self.audit.record_delivery(outcome).await {
            tracing::warn!(
                name = "alerts.dispatch.delivery_log_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to append delivery log record"
            );
        }
    }
}
