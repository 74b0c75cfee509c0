//! OpenAPI/Utoipa configuration.

use crate::api::{
    alerts::ALERTS_TAG, donors::DONORS_TAG, events::EVENTS_TAG, health::MISC_TAG,
};
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Blood-Connect API",
        version = "1.0.0",
        description = "API for coordinating blood donors and broadcasting emergency alerts."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ALERTS_TAG, description = "Emergency alert endpoints"),
        (name = DONORS_TAG, description = "Donor directory endpoints"),
        (name = EVENTS_TAG, description = "Realtime event stream")
    )
)]
pub struct ApiDoc;
