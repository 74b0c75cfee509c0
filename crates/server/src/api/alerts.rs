//! Emergency alert API endpoints.
//!
//! - `/emergency` - Trigger an emergency alert broadcast
//! - `/respond` - Public response link opened by a notified donor

use crate::AppResources;
use crate::compatibility::BloodGroup;
use crate::error::{DispatchError, ResponseError};
use axum::{Extension, Json, extract::Query, response::IntoResponse};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const ALERTS_TAG: &str = "Alerts API";

#[derive(Deserialize, ToSchema)]
pub struct TriggerAlert {
    /// Requested blood group, e.g. `O-`.
    blood_group: String,
    /// Postal code of the region the blood is needed in.
    pincode: String,
    /// Phone number donors should call back.
    contact_phone: String,
    /// Id of the user triggering the alert.
    triggered_by: i32,
}

/// Dispatch summary returned to the caller. Recipient contact details stay
/// in the delivery log; only counts cross the API boundary.
#[derive(Serialize, ToSchema)]
pub struct AlertSummary {
    pub matched: usize,
    pub used_fallback: bool,
    pub email_sent: u32,
    pub email_failed: u32,
    pub sms_sent: u32,
    pub sms_failed: u32,
}

#[derive(Deserialize, IntoParams)]
pub struct RespondParams {
    #[serde(default)]
    email: String,
    #[serde(default)]
    blood_group: String,
}

/// Creates the alerts API router.
#[tracing::instrument(skip_all)]
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(trigger_emergency_alert))
        .routes(routes!(record_response))
}

#[tracing::instrument(skip(resources, payload), fields(blood_group = payload.blood_group, pincode = payload.pincode))]
#[utoipa::path(
    post,
    path = "/emergency",
    operation_id = "Trigger Emergency Alert",
    tag = ALERTS_TAG,
    summary = "Broadcast an emergency blood request to matching donors",
    description = "Matches donors by blood group and postal code and notifies them by email \
                   and SMS.\n\n\
                   **Process:**\n\
                   1. Donors with the exact blood group and postal code are selected\n\
                   2. If none match, the alert falls back to all registered donors\n\
                   3. Every matched donor is contacted on every configured channel\n\
                   4. Per-channel outcome counts are returned and written to the audit log\n\n\
                   A failed send to one donor never aborts the broadcast; the counters in \
                   the response account for every attempt.",
    request_body(
        content = TriggerAlert,
        description = "Alert criteria"
    ),
    responses(
        (status = 200, description = "Dispatch completed", body = AlertSummary),
        (status = 400, description = "Invalid criteria (empty field or unknown blood group)", content_type = "application/json"),
        (status = 404, description = "No donors are registered at all", content_type = "application/json"),
        (status = 500, description = "Donor directory failure", content_type = "application/json")
    )
)]
async fn trigger_emergency_alert(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<TriggerAlert>,
) -> impl IntoResponse {
    let blood_group: BloodGroup = match payload.blood_group.parse() {
        Ok(group) => group,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": e })));
        }
    };

    let criteria = crate::alerts::AlertCriteria {
        blood_group,
        pincode: payload.pincode,
        contact_phone: payload.contact_phone,
        triggered_by: payload.triggered_by,
    };

    match resources.dispatcher.dispatch(criteria).await {
        Ok(result) => {
            let summary = AlertSummary {
                matched: result.matched_recipients.len(),
                used_fallback: result.used_fallback,
                email_sent: result.email_sent,
                email_failed: result.email_failed,
                sms_sent: result.sms_sent,
                sms_failed: result.sms_failed,
            };
            (StatusCode::OK, Json(json!(summary)))
        }
        Err(DispatchError::Validation(message)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
        }
        Err(DispatchError::NoRecipients) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No donors are registered yet" })),
        ),
        Err(DispatchError::Directory(e)) => {
            tracing::error!(
                name = "api.trigger_emergency_alert.directory_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Donor directory query failed"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Donor lookup failed" })),
            )
        }
    }
}

#[tracing::instrument(skip(resources, params))]
#[utoipa::path(
    get,
    path = "/respond",
    operation_id = "Record Donor Response",
    tag = ALERTS_TAG,
    summary = "Record a donor's response to an emergency alert",
    description = "Public, unauthenticated endpoint opened from the link embedded in alert \
                   notifications. Appends a response record for the donor matching the given \
                   email.\n\n\
                   The acknowledgement is deliberately identical whether or not the email \
                   belongs to a registered donor, so the endpoint cannot be used to probe \
                   which addresses exist.",
    params(RespondParams),
    responses(
        (status = 200, description = "Response acknowledged", content_type = "application/json"),
        (status = 400, description = "Missing email or blood group parameter", content_type = "application/json"),
        (status = 500, description = "Database failure", content_type = "application/json")
    )
)]
async fn record_response(
    Extension(resources): Extension<AppResources>,
    Query(params): Query<RespondParams>,
) -> impl IntoResponse {
    match resources
        .recorder
        .record(&params.email, &params.blood_group)
        .await
    {
        // Unknown donors get the success acknowledgement on purpose; see the
        // endpoint description.
        Ok(()) | Err(ResponseError::UnknownDonor) => (
            StatusCode::OK,
            Json(json!({ "status": "Thank you! Your response has been recorded." })),
        ),
        Err(ResponseError::InvalidLink) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "email and blood_group are required" })),
        ),
        Err(ResponseError::Database(e)) => {
            tracing::error!(
                name = "api.record_response.db_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to record donor response"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to record response" })),
            )
        }
    }
}
