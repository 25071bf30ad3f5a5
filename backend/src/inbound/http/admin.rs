//! Admin-only handlers for user management and inventory analytics.
//!
//! ```text
//! GET /api/v1/admin?user=all
//! PATCH /api/v1/admin {"userId":"…","role":"admin"}
//! GET /api/v1/admin/inventory-stats
//! ```

use actix_web::{get, patch, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{InventoryStats, Principal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_descriptor_error, parse_role, parse_user_id, require,
};

const ALL_USERS: &str = "all";

/// Query string for `GET /api/v1/admin`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AdminQueryParams {
    /// Listing to produce; only `all` is supported.
    pub user: Option<String>,
}

/// `{users}` body for the admin user listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListEnvelope {
    /// Every account.
    pub users: Vec<UserResponse>,
}

/// Body for `PATCH /api/v1/admin`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentBody {
    /// Account to update.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub user_id: Option<String>,
    /// New role, `admin` or `regular`.
    #[schema(example = "admin")]
    pub role: Option<String>,
}

/// `{success}` acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessEnvelope {
    /// Always `true`.
    pub success: bool,
}

/// `{success, data}` body for inventory statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryStatsEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Per-group flows, request statistics and totals.
    #[schema(value_type = crate::inbound::http::schemas::InventoryStatsSchema)]
    pub data: InventoryStats,
}

/// List every account.
#[utoipa::path(
    get,
    path = "/api/v1/admin",
    params(AdminQueryParams),
    responses(
        (status = 200, description = "All users", body = UserListEnvelope),
        (status = 400, description = "Unsupported listing", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/admin")]
pub async fn list_users(
    state: web::Data<HttpState>,
    principal: Principal,
    query: web::Query<AdminQueryParams>,
) -> ApiResult<web::Json<UserListEnvelope>> {
    let field = FieldName::new("user");
    let listing = require(query.into_inner().user, field)?;
    if listing != ALL_USERS {
        return Err(invalid_descriptor_error(field, &listing));
    }
    let users = state.user_admin.list_users(&principal).await?;
    Ok(web::Json(UserListEnvelope {
        users: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Change a user's role.
#[utoipa::path(
    patch,
    path = "/api/v1/admin",
    request_body = RoleAssignmentBody,
    responses(
        (status = 200, description = "Role changed", body = SuccessEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "assignRole"
)]
#[patch("/admin")]
pub async fn assign_role(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<RoleAssignmentBody>,
) -> ApiResult<web::Json<SuccessEnvelope>> {
    principal.require_admin()?;
    let RoleAssignmentBody { user_id, role } = payload.into_inner();
    let id_field = FieldName::new("userId");
    let role_field = FieldName::new("role");
    let user_id = parse_user_id(&require(user_id, id_field)?, id_field)?;
    let role = parse_role(&require(role, role_field)?, role_field)?;
    state
        .user_admin
        .assign_role(&principal, user_id, role)
        .await?;
    Ok(web::Json(SuccessEnvelope { success: true }))
}

/// Inventory by blood group, with request fulfilment.
#[utoipa::path(
    get,
    path = "/api/v1/admin/inventory-stats",
    responses(
        (status = 200, description = "Inventory statistics", body = InventoryStatsEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema),
        (status = 503, description = "Database unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "inventoryStats"
)]
#[get("/admin/inventory-stats")]
pub async fn inventory_stats(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<InventoryStatsEnvelope>> {
    let data = state.inventory.inventory_stats(&principal).await?;
    Ok(web::Json(InventoryStatsEnvelope {
        success: true,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockUserAdministration, UserAdministration};
    use crate::domain::{Role, UserId};
    use crate::test_support::InMemoryStore;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpMessage, dev::ServiceResponse, test};
    use mockall::predicate::{always, eq};
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn app_with_state(
        state: HttpState,
        principal: Principal,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap_fn(move |req, srv| {
                req.extensions_mut().insert(principal);
                actix_web::dev::Service::call(srv, req)
            })
            .service(
                web::scope("/api/v1")
                    .service(inventory_stats)
                    .service(list_users)
                    .service(assign_role),
            )
    }

    async fn body_json(response: ServiceResponse) -> Value {
        serde_json::from_slice(&test::read_body(response).await).expect("json body")
    }

    fn admin() -> Principal {
        Principal::new(UserId::random(), Role::Admin)
    }

    #[actix_web::test]
    async fn role_assignment_is_forwarded_for_admins() {
        let target = UserId::random();
        let mut admin_port = MockUserAdministration::new();
        admin_port
            .expect_assign_role()
            .with(always(), eq(target), eq(Role::Admin))
            .times(1)
            .return_once(|_, _, _| Ok(()));
        let store = Arc::new(InMemoryStore::new());
        let mut state = store.http_state();
        state.user_admin = Arc::new(admin_port) as Arc<dyn UserAdministration>;
        let app = test::init_service(app_with_state(state, admin())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/v1/admin")
                .set_json(json!({ "userId": target.to_string(), "role": "admin" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value.get("success").and_then(Value::as_bool), Some(true));
    }

    #[rstest]
    #[case(json!({ "userId": "nope", "role": "admin" }), "invalid_uuid")]
    #[case(json!({ "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "role": "root" }), "invalid_role")]
    #[case(json!({ "role": "admin" }), "missing_field")]
    #[actix_web::test]
    async fn role_assignment_validates_the_body(#[case] body: Value, #[case] code: &str) {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(app_with_state(store.http_state(), admin())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/v1/admin")
                .set_json(body)
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert_eq!(
            value.pointer("/details/code").and_then(Value::as_str),
            Some(code)
        );
    }

    #[actix_web::test]
    async fn role_assignment_checks_admin_before_the_body() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(app_with_state(
            store.http_state(),
            Principal::new(UserId::random(), Role::Regular),
        ))
        .await;

        let response = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri("/api/v1/admin")
                .set_json(json!({ "userId": "nope", "role": "admin" }))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("/api/v1/admin", StatusCode::BAD_REQUEST)]
    #[case("/api/v1/admin?user=some", StatusCode::BAD_REQUEST)]
    #[case("/api/v1/admin?user=all", StatusCode::OK)]
    #[actix_web::test]
    async fn user_listing_requires_the_all_descriptor(
        #[case] uri: &str,
        #[case] expected: StatusCode,
    ) {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(app_with_state(store.http_state(), admin())).await;

        let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;

        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn inventory_stats_are_wrapped_for_admins() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(app_with_state(store.http_state(), admin())).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/admin/inventory-stats")
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value.get("success").and_then(Value::as_bool), Some(true));
        assert_eq!(
            value
                .pointer("/data/summary/netQuantity")
                .and_then(Value::as_i64),
            Some(0)
        );
    }
}
