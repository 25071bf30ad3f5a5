//! Blood request handlers.
//!
//! ```text
//! POST /api/v1/request {"name":"Ward 7","phone":"9876543210","bloodGroup":"A-","quantity":20}
//! GET /api/v1/request
//! PATCH /api/v1/admin/requests/grant/{id} {"status":"granted"}
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::GrantTransitionRequest;
use crate::domain::{Error, GrantRequestDraft, GrantStatus, Principal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::RequestGrantResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_blood_group, parse_name, parse_phone, parse_quantity, require,
};

/// Request body for `POST /api/v1/request`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequestBody {
    /// Requesting ward or person.
    #[schema(example = "Ward 7")]
    pub name: Option<String>,
    /// Contact number of at least ten digits.
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// Requested blood group, e.g. `A-`.
    #[schema(example = "A-")]
    pub blood_group: Option<String>,
    /// Units requested, an integer in `1..=100`.
    #[schema(value_type = Option<i64>, example = 20)]
    pub quantity: Option<Value>,
}

impl TryFrom<GrantRequestBody> for GrantRequestDraft {
    type Error = Error;

    fn try_from(value: GrantRequestBody) -> Result<Self, Self::Error> {
        let name_field = FieldName::new("name");
        let phone_field = FieldName::new("phone");
        let group_field = FieldName::new("bloodGroup");
        let quantity_field = FieldName::new("quantity");
        Ok(Self {
            name: parse_name(&require(value.name, name_field)?, name_field)?,
            phone: parse_phone(require(value.phone, phone_field)?, phone_field)?,
            blood_group: parse_blood_group(&require(value.blood_group, group_field)?, group_field)?,
            quantity: parse_quantity(&require(value.quantity, quantity_field)?, quantity_field)?,
        })
    }
}

/// `{success, request}` body returned on submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantRequestEnvelope {
    /// Always `true`.
    pub success: bool,
    /// The stored request, `pending` on submission.
    pub request: RequestGrantResponse,
}

/// `{success, requests}` body listing every grant.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantRequestListEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Every request, newest first.
    pub requests: Vec<RequestGrantResponse>,
}

/// Body for `PATCH /api/v1/admin/requests/grant/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct GrantTransitionBody {
    /// Target status, matched case-insensitively.
    #[schema(example = "granted")]
    pub status: Option<String>,
}

/// Grant state after a transition.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantTransitionData {
    /// Grant identifier.
    pub id: Uuid,
    /// Status after the transition.
    #[schema(value_type = String, example = "granted")]
    pub status: GrantStatus,
}

/// `{success, data}` body returned by a transition.
#[derive(Debug, Serialize, ToSchema)]
pub struct GrantTransitionEnvelope {
    /// Always `true`.
    pub success: bool,
    /// The grant's id and new status.
    pub data: GrantTransitionData,
}

/// Submit a blood request for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/request",
    request_body = GrantRequestBody,
    responses(
        (status = 201, description = "Request submitted", body = GrantRequestEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "submitRequest"
)]
#[post("/request")]
pub async fn submit_request(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<GrantRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = GrantRequestDraft::try_from(payload.into_inner())?;
    let grant = state.grant_requests.submit_request(&principal, draft).await?;
    Ok(HttpResponse::Created().json(GrantRequestEnvelope {
        success: true,
        request: grant.into(),
    }))
}

/// List every request, newest first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/request",
    responses(
        (status = 200, description = "All requests", body = GrantRequestListEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["requests"],
    operation_id = "listRequests"
)]
#[get("/request")]
pub async fn list_requests(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<GrantRequestListEnvelope>> {
    let grants = state.grant_requests_query.list_requests(&principal).await?;
    Ok(web::Json(GrantRequestListEnvelope {
        success: true,
        requests: grants.into_iter().map(RequestGrantResponse::from).collect(),
    }))
}

/// Move a request to `pending`, `granted` or `rejected`. Admin only.
///
/// Granting creates exactly one `OUT` ledger entry; leaving `granted`
/// removes it. Both happen in the same transaction as the status change.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/requests/grant/{id}",
    params(("id" = String, Path, description = "Grant identifier")),
    request_body = GrantTransitionBody,
    responses(
        (status = 200, description = "Transition applied", body = GrantTransitionEnvelope),
        (status = 400, description = "Unknown status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown request", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema),
        (status = 422, description = "Transition not allowed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "transitionGrant"
)]
#[patch("/admin/requests/grant/{id}")]
pub async fn transition_grant(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
    payload: web::Json<GrantTransitionBody>,
) -> ApiResult<web::Json<GrantTransitionEnvelope>> {
    let request = GrantTransitionRequest {
        grant_id: path.into_inner(),
        requested_status: payload.into_inner().status.unwrap_or_default(),
    };
    let outcome = state
        .grant_transitions
        .transition(&principal, request)
        .await?;
    Ok(web::Json(GrantTransitionEnvelope {
        success: true,
        data: GrantTransitionData {
            id: outcome.id,
            status: outcome.status,
        },
    }))
}
