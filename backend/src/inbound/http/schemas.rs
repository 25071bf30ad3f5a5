//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication is missing or the caller is not an admin.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// A concurrent update won and retries were exhausted.
    #[schema(rename = "conflict")]
    Conflict,
    /// The grant status change is not allowed.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// The database could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "unknown status: shipped")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for one direction of [`crate::domain::BloodGroupInventory`].
#[derive(ToSchema)]
#[schema(as = crate::domain::FlowStats)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FlowStatsSchema {
    quantity: i64,
    transactions: i64,
    unique_users: usize,
    user_ids: Vec<String>,
}

/// OpenAPI schema for [`crate::domain::RequestStats`].
#[derive(ToSchema)]
#[schema(as = crate::domain::RequestStats)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RequestStatsSchema {
    total_requests: i64,
    total_accepted_requests: i64,
    total_requested_quantity: i64,
    total_granted_quantity: i64,
    #[schema(example = 66.67)]
    fulfillment_percentage: f64,
}

/// OpenAPI schema for [`crate::domain::BloodGroupInventory`].
#[derive(ToSchema)]
#[schema(as = crate::domain::BloodGroupInventory)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BloodGroupInventorySchema {
    #[schema(rename = "in")]
    inflow: FlowStatsSchema,
    #[schema(rename = "out")]
    outflow: FlowStatsSchema,
    request_stats: RequestStatsSchema,
    net_quantity: i64,
}

/// OpenAPI schema for [`crate::domain::InventorySummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::InventorySummary)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct InventorySummarySchema {
    total_in_quantity: i64,
    total_out_quantity: i64,
    net_quantity: i64,
}

/// OpenAPI schema for [`crate::domain::InventoryStats`].
///
/// `byBloodGroup` is keyed by blood group label (`A+` … `O-`).
#[derive(ToSchema)]
#[schema(as = crate::domain::InventoryStats)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct InventoryStatsSchema {
    summary: InventorySummarySchema,
    by_blood_group: BTreeMap<String, BloodGroupInventorySchema>,
}

/// OpenAPI schema for [`crate::domain::DonationTotals`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DonationTotals)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DonationTotalsSchema {
    total_quantity_of_donations: i64,
    total_donations_count: usize,
    #[schema(value_type = Option<String>, format = DateTime)]
    last_donation_at: Option<String>,
}

/// OpenAPI schema for [`crate::domain::DonationRecord`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DonationRecord)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DonationRecordSchema {
    id: uuid::Uuid,
    #[schema(rename = "type")]
    #[schema(example = "IN")]
    direction: String,
    phone: Option<String>,
    #[schema(example = "O+")]
    blood_group: String,
    quantity: u8,
    #[schema(value_type = String, format = DateTime)]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::GroupDonations`].
#[derive(ToSchema)]
#[schema(as = crate::domain::GroupDonations)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct GroupDonationsSchema {
    #[schema(example = "O+")]
    group: String,
    quantity: i64,
    count: usize,
}

/// OpenAPI schema for [`crate::domain::DonationSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DonationSummary)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DonationSummarySchema {
    summary: DonationTotalsSchema,
    history: Vec<DonationRecordSchema>,
    group_wise_breakdown: Vec<GroupDonationsSchema>,
}
