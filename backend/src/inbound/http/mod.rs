//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod admin;
pub mod donations;
pub mod dto;
pub mod error;
pub mod grant_requests;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// The caller owns the scope and its session middleware. `dev_login` mounts
/// `POST /login`, which trusts the identity in the request body; leave it off
/// when an identity proxy performs sign-in.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use bloodbank::inbound::http::configure_api;
///
/// let app = App::new().service(web::scope("/api/v1").configure(|cfg| configure_api(cfg, false)));
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig, dev_login: bool) {
    cfg.app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(error::query_error_handler));
    if dev_login {
        cfg.service(users::login);
    }
    cfg.service(users::logout)
        .service(users::current_user)
        .service(users::update_user)
        .service(donations::record_donation)
        .service(donations::donation_summary)
        .service(grant_requests::submit_request)
        .service(grant_requests::list_requests)
        .service(grant_requests::transition_grant)
        .service(admin::inventory_stats)
        .service(admin::list_users)
        .service(admin::assign_role);
}
