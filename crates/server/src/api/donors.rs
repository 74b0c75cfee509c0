//! Donor directory API endpoints.
//!
//! - `/register` - Register a new donor
//! - `/search` - Compatibility-aware donor search
//! - `/leaderboard` - Top donors by recorded responses

use crate::AppResources;
use crate::compatibility::{self, BloodGroup};
use crate::entity::{donor, donor_response};
use axum::{Extension, Json, extract::Query, response::IntoResponse};
use hyper::StatusCode;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Tag for OpenAPI documentation.
pub const DONORS_TAG: &str = "Donors API";

#[derive(Deserialize, ToSchema)]
pub struct RegisterDonor {
    name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    blood_group: String,
    pincode: String,
    #[serde(default)]
    city: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchParams {
    /// Blood group the patient needs.
    blood_group: String,
    /// Preferred postal code; matching donors rank first.
    #[serde(default)]
    pincode: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DonorMatch {
    pub name: String,
    pub blood_group: String,
    pub pincode: String,
    pub city: Option<String>,
    pub phone: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaderboardEntry {
    pub name: String,
    pub blood_group: String,
    pub responses: i64,
}

/// Creates the donors API router.
#[tracing::instrument(skip_all)]
pub fn router() -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(register_donor))
        .routes(routes!(search_donors))
        .routes(routes!(leaderboard))
}

#[tracing::instrument(skip(resources, payload), fields(blood_group = payload.blood_group, email_len = payload.email.len()))]
#[utoipa::path(
    post,
    path = "/register",
    operation_id = "Register Donor",
    tag = DONORS_TAG,
    summary = "Register a new donor",
    request_body(content = RegisterDonor, description = "Donor details"),
    responses(
        (status = 201, description = "Donor registered", content_type = "application/json"),
        (status = 400, description = "Missing field or unknown blood group", content_type = "application/json"),
        (status = 409, description = "A donor with this email already exists", content_type = "application/json"),
        (status = 500, description = "Database failure", content_type = "application/json")
    )
)]
async fn register_donor(
    Extension(resources): Extension<AppResources>,
    Json(payload): Json<RegisterDonor>,
) -> impl IntoResponse {
    let name = payload.name.trim();
    let email = payload.email.trim().to_lowercase();
    let pincode = payload.pincode.trim();
    if name.is_empty() || email.is_empty() || pincode.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "name, email and pincode are required" })),
        );
    }
    let blood_group: BloodGroup = match payload.blood_group.parse() {
        Ok(group) => group,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))),
    };

    let existing = donor::Entity::find()
        .filter(donor::Column::Email.eq(email.clone()))
        .one(resources.db.as_ref())
        .await;
    match existing {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "error": "A donor with this email already exists" })),
            );
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(
                name = "api.register_donor.db_query_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to query existing donor"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database error" })),
            );
        }
    }

    let new_donor = donor::ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(name.to_string()),
        email: ActiveValue::Set(email),
        phone: ActiveValue::Set(payload.phone.filter(|p| !p.trim().is_empty())),
        blood_group: ActiveValue::Set(blood_group.to_string()),
        pincode: ActiveValue::Set(pincode.to_string()),
        city: ActiveValue::Set(payload.city.filter(|c| !c.trim().is_empty())),
        available: ActiveValue::Set(true),
        last_donation_at: ActiveValue::Set(None),
        last_response_at: ActiveValue::Set(None),
        created_at: ActiveValue::Set(OffsetDateTime::now_utc()),
    };
    match new_donor.insert(resources.db.as_ref()).await {
        Ok(model) => (StatusCode::CREATED, Json(json!({ "id": model.id }))),
        Err(e) => {
            tracing::error!(
                name = "api.register_donor.db_insert_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Failed to insert donor"
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database error" })),
            )
        }
    }
}

#[tracing::instrument(skip(resources, params))]
#[utoipa::path(
    get,
    path = "/search",
    operation_id = "Search Donors",
    tag = DONORS_TAG,
    summary = "Find donors able to give blood to a patient",
    description = "Returns available donors whose blood group is medically compatible with \
                   the requested one, excluding donors inside the 56-day post-donation \
                   window. Exact-group matches rank above merely-compatible ones; a donor \
                   in the requested postal code ranks above one elsewhere.",
    params(SearchParams),
    responses(
        (status = 200, description = "Ranked donor matches", body = [DonorMatch]),
        (status = 400, description = "Unknown blood group", content_type = "application/json"),
        (status = 500, description = "Database failure", content_type = "application/json")
    )
)]
async fn search_donors(
    Extension(resources): Extension<AppResources>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let wanted: BloodGroup = match params.blood_group.parse() {
        Ok(group) => group,
        Err(e) => return (StatusCode::BAD_REQUEST, Json(json!({ "error": e }))),
    };

    let compatible: Vec<&str> = wanted
        .compatible_donors()
        .iter()
        .map(|g| g.as_str())
        .collect();

    let donors = match donor::Entity::find()
        .filter(donor::Column::Available.eq(true))
        .filter(donor::Column::BloodGroup.is_in(compatible))
        .all(resources.db.as_ref())
        .await
    {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!(
                name = "api.search_donors.db_query_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Donor search query failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database error" })),
            );
        }
    };

    let now = OffsetDateTime::now_utc();
    let mut ranked: Vec<(i64, donor::Model)> = donors
        .into_iter()
        .filter(|d| compatibility::eligible_to_donate(d.last_donation_at, now))
        .map(|d| {
            let group: BloodGroup = d.blood_group.parse().unwrap_or(wanted);
            let mut score = compatibility::match_score(group, wanted, d.last_donation_at, now);
            if params.pincode.as_deref() == Some(d.pincode.as_str()) {
                score += 1_000;
            }
            (score, d)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let matches: Vec<DonorMatch> = ranked
        .into_iter()
        .map(|(_, d)| DonorMatch {
            name: d.name,
            blood_group: d.blood_group,
            pincode: d.pincode,
            city: d.city,
            phone: d.phone,
        })
        .collect();

    (StatusCode::OK, Json(json!(matches)))
}

#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/leaderboard",
    operation_id = "Donor Leaderboard",
    tag = DONORS_TAG,
    summary = "Top donors by recorded alert responses",
    responses(
        (status = 200, description = "Leaderboard entries, most responses first", body = [LeaderboardEntry]),
        (status = 500, description = "Database failure", content_type = "application/json")
    )
)]
async fn leaderboard(Extension(resources): Extension<AppResources>) -> impl IntoResponse {
    let counts: Result<Vec<(i32, i64)>, _> = donor_response::Entity::find()
        .select_only()
        .column(donor_response::Column::DonorId)
        .column_as(donor_response::Column::Id.count(), "responses")
        .group_by(donor_response::Column::DonorId)
        .order_by_desc(donor_response::Column::Id.count())
        .limit(10)
        .into_tuple()
        .all(resources.db.as_ref())
        .await;

    let counts = match counts {
        Ok(counts) => counts,
        Err(e) => {
            tracing::error!(
                name = "api.leaderboard.db_query_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Leaderboard aggregation failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database error" })),
            );
        }
    };

    let ids: Vec<i32> = counts.iter().map(|(id, _)| *id).collect();
    let donors = match donor::Entity::find()
        .filter(donor::Column::Id.is_in(ids))
        .all(resources.db.as_ref())
        .await
    {
        Ok(donors) => donors,
        Err(e) => {
            tracing::error!(
                name = "api.leaderboard.db_fetch_failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = %e,
                message = "Leaderboard donor fetch failed"
            );
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Database error" })),
            );
        }
    };

    // Preserve the count ordering when joining donor rows back in.
    let entries: Vec<LeaderboardEntry> = counts
        .into_iter()
        .filter_map(|(donor_id, responses)| {
            donors.iter().find(|d| d.id == donor_id).map(|d| LeaderboardEntry {
                name: d.name.clone(),
                blood_group: d.blood_group.clone(),
                responses,
            })
        })
        .collect();

    (StatusCode::OK, Json(json!(entries)))
}
