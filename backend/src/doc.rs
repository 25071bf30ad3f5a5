//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! request and response envelopes, and the schema wrappers from
//! [`crate::inbound::http::schemas`] that stand in for domain types. Swagger UI
//! serves the document in debug builds.

use crate::inbound::http::admin::{
    InventoryStatsEnvelope, RoleAssignmentBody, SuccessEnvelope, UserListEnvelope,
};
use crate::inbound::http::donations::{
    DonationEnvelope, DonationRequest, DonationSummaryEnvelope,
};
use crate::inbound::http::dto::{LedgerEntryResponse, RequestGrantResponse, UserResponse};
use crate::inbound::http::grant_requests::{
    GrantRequestBody, GrantRequestEnvelope, GrantRequestListEnvelope, GrantTransitionBody,
    GrantTransitionData, GrantTransitionEnvelope,
};
use crate::inbound::http::schemas::{
    BloodGroupInventorySchema, DonationRecordSchema, DonationSummarySchema, DonationTotalsSchema,
    ErrorCodeSchema, ErrorSchema, FlowStatsSchema, GroupDonationsSchema, InventoryStatsSchema,
    InventorySummarySchema, RequestStatsSchema,
};
use crate::inbound::http::users::{
    LoginRequest, ProfileUpdateRequest, UpdatedUserEnvelope, UserEnvelope,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Private session cookie issued at sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Blood bank backend API",
        description = "Donor sign-in, donations, grant requests and admin inventory.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::donations::record_donation,
        crate::inbound::http::donations::donation_summary,
        crate::inbound::http::grant_requests::submit_request,
        crate::inbound::http::grant_requests::list_requests,
        crate::inbound::http::grant_requests::transition_grant,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::assign_role,
        crate::inbound::http::admin::inventory_stats,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserResponse,
        LedgerEntryResponse,
        RequestGrantResponse,
        LoginRequest,
        ProfileUpdateRequest,
        UserEnvelope,
        UpdatedUserEnvelope,
        DonationRequest,
        DonationEnvelope,
        DonationSummaryEnvelope,
        DonationSummarySchema,
        DonationTotalsSchema,
        DonationRecordSchema,
        GroupDonationsSchema,
        GrantRequestBody,
        GrantRequestEnvelope,
        GrantRequestListEnvelope,
        GrantTransitionBody,
        GrantTransitionData,
        GrantTransitionEnvelope,
        RoleAssignmentBody,
        SuccessEnvelope,
        UserListEnvelope,
        InventoryStatsEnvelope,
        InventoryStatsSchema,
        InventorySummarySchema,
        BloodGroupInventorySchema,
        FlowStatsSchema,
        RequestStatsSchema,
    )),
    tags(
        (name = "users", description = "Sign-in and self-service profile"),
        (name = "donations", description = "Recording donations and donor history"),
        (name = "requests", description = "Blood requests and their admin decision"),
        (name = "admin", description = "User administration and inventory"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", &["code", "message", "traceId", "details"])]
    #[case("UserResponse", &["id", "bloodGroup", "medicalHistory", "role"])]
    #[case("RequestGrantResponse", &["status", "bloodTransactionCreated", "ledgerEntryId"])]
    #[case("LedgerEntryResponse", &["type", "bloodGroup", "requestGrantId"])]
    #[case("crate.domain.InventoryStats", &["summary", "byBloodGroup"])]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] expected: &[&str]) {
        let fields = object_fields(name);

        for field in expected {
            assert!(
                fields.iter().any(|f| f == field),
                "{name} should have field '{field}', has {fields:?}"
            );
        }
    }

    #[rstest]
    fn every_api_route_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for path in [
            "/api/v1/login",
            "/api/v1/logout",
            "/api/v1/user",
            "/api/v1/donation",
            "/api/v1/request",
            "/api/v1/admin/requests/grant/{id}",
            "/api/v1/admin",
            "/api/v1/admin/inventory-stats",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == path),
                "missing {path} in {paths:?}"
            );
        }
    }
}
