//! Users API handlers.
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","name":"Ada Lovelace"}
//! POST /api/v1/logout
//! GET /api/v1/user
//! POST /api/v1/user {"phone":"9876543210","bloodGroup":"AB+"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Error, Principal, ProfileUpdate, SignInIdentity};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::dto::UserResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_blood_group, parse_email, parse_name, parse_phone, require,
};

/// Sign-in request body for `POST /api/v1/login`.
///
/// The identity is asserted by the provider in front of the service; the
/// route is only mounted when development sign-in is enabled.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Provider-verified email.
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    /// Provider display name.
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    /// Avatar URL.
    pub profile_image: Option<String>,
}

impl TryFrom<LoginRequest> for SignInIdentity {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        let email = require(value.email, FieldName::new("email"))?;
        let name = require(value.name, FieldName::new("name"))?;
        Ok(Self {
            email: parse_email(&email, FieldName::new("email"))?,
            name: parse_name(&name, FieldName::new("name"))?,
            profile_image: value.profile_image,
        })
    }
}

/// Whitelisted profile fields accepted by `POST /api/v1/user`.
///
/// Unknown fields, including `email` and `role`, are ignored.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    /// Display name; must not be blank.
    pub name: Option<String>,
    /// Contact number of at least ten digits.
    #[schema(example = "9876543210")]
    pub phone: Option<String>,
    /// Free-text medical notes.
    pub medical_history: Option<String>,
    /// Blood group, e.g. `AB+`.
    #[schema(example = "AB+")]
    pub blood_group: Option<String>,
    /// Avatar URL.
    pub profile_image: Option<String>,
}

impl TryFrom<ProfileUpdateRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileUpdateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value
                .name
                .map(|name| parse_name(&name, FieldName::new("name")))
                .transpose()?,
            phone: value
                .phone
                .map(|phone| parse_phone(phone, FieldName::new("phone")))
                .transpose()?,
            medical_history: value.medical_history,
            blood_group: value
                .blood_group
                .map(|group| parse_blood_group(&group, FieldName::new("bloodGroup")))
                .transpose()?,
            profile_image: value.profile_image,
        })
    }
}

/// `{user}` body returned by sign-in and profile reads.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    /// The caller's account.
    pub user: UserResponse,
}

/// `{user, success}` body returned by profile updates.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdatedUserEnvelope {
    /// The account after the update.
    pub user: UserResponse,
    /// Always `true`.
    pub success: bool,
}

/// Sign in, creating the account on first use, and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserEnvelope>> {
    let identity = SignInIdentity::try_from(payload.into_inner())?;
    let user = state.login.sign_in(identity).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, role = %user.role, "user signed in");
    Ok(web::Json(UserEnvelope {
        user: user.into(),
    }))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Return the caller's account.
#[utoipa::path(
    get,
    path = "/api/v1/user",
    responses(
        (status = 200, description = "Current user", body = UserEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account removed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/user")]
pub async fn current_user(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<UserEnvelope>> {
    let user = state.profile.profile(&principal).await?;
    Ok(web::Json(UserEnvelope {
        user: user.into(),
    }))
}

/// Update the caller's whitelisted profile fields.
#[utoipa::path(
    post,
    path = "/api/v1/user",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated user", body = UpdatedUserEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Account removed", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[post("/user")]
pub async fn update_user(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<UpdatedUserEnvelope>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state
        .profile_command
        .update_profile(&principal, update)
        .await?;
    Ok(web::Json(UpdatedUserEnvelope {
        user: user.into(),
        success: true,
    }))
}
