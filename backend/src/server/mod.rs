//! Builds the Actix application: the `/api/v1` scope behind the session
//! cookie, health probes at the root and Swagger UI in debug builds.

mod config;
pub mod settings;
mod state_builders;

pub use config::ServerConfig;

use std::sync::Arc;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::DefaultClock;

use bloodbank::Trace;
#[cfg(debug_assertions)]
use bloodbank::doc::ApiDoc;
use bloodbank::inbound::http::configure_api;
use bloodbank::inbound::http::health::{HealthState, live, ready};
use bloodbank::inbound::http::session_config::SessionSettings;
use bloodbank::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
    dev_login: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
        dev_login,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .configure(|cfg| configure_api(cfg, dev_login));

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Bind the listener and wire the Diesel-backed services into every worker.
///
/// `health_state` turns ready once the socket is bound. The returned
/// [`Server`] does nothing until awaited.
///
/// # Errors
/// Fails when the address cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        session,
        bind_addr,
        db_pool,
        dev_login,
    } = config;
    let http_state = web::Data::new(build_http_state(&db_pool, Arc::new(DefaultClock)));

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
            dev_login,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
