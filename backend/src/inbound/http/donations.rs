//! Donation API handlers.
//!
//! ```text
//! POST /api/v1/donation {"bloodGroup":"O+","quantity":50,"phone":"9876543210"}
//! GET /api/v1/donation?desc=summary
//! ```

use actix_web::{get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DonationDraft, DonationSummary, Error, Principal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::LedgerEntryResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_descriptor_error, parse_blood_group, parse_name, parse_phone,
    parse_quantity, require,
};

const SUMMARY_DESCRIPTOR: &str = "summary";
const SUMMARY_MESSAGE: &str = "Data retrieved successfully";

/// Donation body for `POST /api/v1/donation`.
///
/// `donatedBloodGroup` is accepted in place of `bloodGroup`. `quantity`
/// stays untyped so non-integer values surface as validation errors rather
/// than deserialisation failures.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationRequest {
    /// Donated blood group, e.g. `O+`.
    #[schema(example = "O+")]
    pub blood_group: Option<String>,
    /// Alias for `bloodGroup`; used only when `bloodGroup` is absent.
    #[schema(example = "O+")]
    pub donated_blood_group: Option<String>,
    /// Units donated, an integer in `1..=100`.
    #[schema(value_type = Option<i64>, example = 50)]
    pub quantity: Option<Value>,
    /// Contact number of at least ten digits.
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// Donor name; must not be blank when present.
    pub name: Option<String>,
}

impl TryFrom<DonationRequest> for DonationDraft {
    type Error = Error;

    fn try_from(value: DonationRequest) -> Result<Self, Self::Error> {
        let (group, field) = match (value.blood_group, value.donated_blood_group) {
            (Some(group), _) => (Some(group), FieldName::new("bloodGroup")),
            (None, alias) => (alias, FieldName::new("donatedBloodGroup")),
        };
        let group = require(group, FieldName::new("bloodGroup"))?;
        let blood_group = parse_blood_group(&group, field)?;

        let quantity_field = FieldName::new("quantity");
        let quantity = parse_quantity(&require(value.quantity, quantity_field)?, quantity_field)?;

        let phone_field = FieldName::new("phone");
        let phone = parse_phone(require(value.phone, phone_field)?, phone_field)?;

        if let Some(name) = value.name {
            parse_name(&name, FieldName::new("name"))?;
        }

        Ok(Self {
            blood_group,
            quantity,
            phone,
        })
    }
}

/// `{donation, success}` body returned after recording a donation.
#[derive(Debug, Serialize, ToSchema)]
pub struct DonationEnvelope {
    /// The recorded `IN` ledger entry.
    pub donation: LedgerEntryResponse,
    /// Always `true`.
    pub success: bool,
}

/// Query string for `GET /api/v1/donation`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DonationQueryParams {
    /// Report to produce; only `summary` is supported.
    pub desc: Option<String>,
}

/// `{success, message, data, timestamp}` body for the donation summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct DonationSummaryEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Fixed confirmation text.
    #[schema(example = "Data retrieved successfully")]
    pub message: String,
    /// Totals, per-group breakdown and donation history.
    #[schema(value_type = crate::inbound::http::schemas::DonationSummarySchema)]
    pub data: DonationSummary,
    /// When the summary was computed.
    pub timestamp: DateTime<Utc>,
}

/// Record a donation as an `IN` ledger entry for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/donation",
    request_body = DonationRequest,
    responses(
        (status = 200, description = "Donation recorded", body = DonationEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "recordDonation"
)]
#[post("/donation")]
pub async fn record_donation(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<DonationRequest>,
) -> ApiResult<web::Json<DonationEnvelope>> {
    let draft = DonationDraft::try_from(payload.into_inner())?;
    let entry = state.donations.record_donation(&principal, draft).await?;
    Ok(web::Json(DonationEnvelope {
        donation: entry.into(),
        success: true,
    }))
}

/// Summarise the caller's donations.
#[utoipa::path(
    get,
    path = "/api/v1/donation",
    params(DonationQueryParams),
    responses(
        (status = 200, description = "Donation summary", body = DonationSummaryEnvelope),
        (status = 400, description = "Unsupported descriptor", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["donations"],
    operation_id = "donationSummary"
)]
#[get("/donation")]
pub async fn donation_summary(
    state: web::Data<HttpState>,
    principal: Principal,
    query: web::Query<DonationQueryParams>,
) -> ApiResult<web::Json<DonationSummaryEnvelope>> {
    let desc = query.into_inner().desc;
    match desc.as_deref() {
        None | Some(SUMMARY_DESCRIPTOR) => {}
        Some(other) => return Err(invalid_descriptor_error(FieldName::new("desc"), other)),
    }
    let data = state.donations_query.donation_summary(&principal).await?;
    Ok(web::Json(DonationSummaryEnvelope {
        success: true,
        message: SUMMARY_MESSAGE.to_owned(),
        data,
        timestamp: Utc::now(),
    }))
}
