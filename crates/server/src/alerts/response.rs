//! Recording of inbound donor responses.
//!
//! A notified donor opens the public response link from an alert; the
//! recorder resolves them by email, appends a response row, and stamps the
//! donor profile. Responses are a log, not a toggle: repeated clicks create
//! distinct rows by design of the data model.

use crate::alerts::directory::DonorDirectory;
use crate::entity::{donor, donor_response};
use crate::error::ResponseError;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, IntoActiveModel};
use std::sync::Arc;
use time::OffsetDateTime;

pub struct ResponseRecorder {
    directory: Arc<dyn DonorDirectory>,
    db: Arc<DatabaseConnection>,
}

impl ResponseRecorder {
    pub fn new(directory: Arc<dyn DonorDirectory>, db: Arc<DatabaseConnection>) -> Self {
        Self { directory, db }
    }

    /// Record one response. Both parameters are required; an unknown email
    /// fails with [`ResponseError::UnknownDonor`] and persists nothing.
    ///
    /// The HTTP layer intentionally maps `UnknownDonor` to the same neutral
    /// acknowledgement as success so the endpoint cannot be used to probe
    /// which emails are registered.
    #[tracing::instrument(skip(self, email))]
    pub async fn record(&self, email: &str, blood_group: &str) -> Result<(), ResponseError> {
        let email = email.trim();
        let blood_group = blood_group.trim();
        if email.is_empty() || blood_group.is_empty() {
            return Err(ResponseError::InvalidLink);
        }

        let Some(donor) = self.directory.find_by_email(email).await? else {
            return Err(ResponseError::UnknownDonor);
        };

        let now = OffsetDateTime::now_utc();

        let entry = donor_response::ActiveModel {
            id: ActiveValue::NotSet,
            donor_id: ActiveValue::Set(donor.id),
            blood_group_acknowledged: ActiveValue::Set(blood_group.to_string()),
            responded_at: ActiveValue::Set(now),
        };
        entry.insert(self.db.as_ref()).await?;

        let mut profile: donor::ActiveModel = donor.into_active_model();
        profile.last_response_at = ActiveValue::Set(Some(now));
        profile.update(self.db.as_ref()).await?;

        tracing::info!(
            name = "alerts.response.recorded",
            target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
            message = "Donor response recorded"
        );

        Ok(())
    }
}
