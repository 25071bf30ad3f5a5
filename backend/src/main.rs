//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API with its health probes and OpenAPI docs.

mod server;

#[cfg(feature = "example-data")]
use std::ffi::OsString;
use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "example-data")]
use bloodbank::example_data::{ExampleDataSettings, seed_example_data_on_startup};
use bloodbank::inbound::http::health::HealthState;
use bloodbank::inbound::http::session_config::{BuildMode, session_settings_from_env};
use bloodbank::outbound::persistence::{DbPool, run_pending_migrations};

use server::settings::AppSettings;
use server::{ServerConfig, create_server};

#[cfg(feature = "example-data")]
fn program_name() -> OsString {
    std::env::args_os()
        .next()
        .unwrap_or_else(|| OsString::from("bloodbank"))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("invalid settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let pool_config = settings.pool_config().map_err(io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(io::Error::other)?;

    if settings.run_migrations {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
    }

    let db_pool = DbPool::new(pool_config)
        .await
        .map_err(|e| io::Error::other(format!("database pool: {e}")))?;

    #[cfg(feature = "example-data")]
    {
        let example_data = ExampleDataSettings::load_from_iter([program_name()])
            .map_err(|e| io::Error::other(format!("invalid example data settings: {e}")))?;
        seed_example_data_on_startup(&example_data, Some(&db_pool))
            .await
            .map_err(io::Error::other)?;
    }

    let health_state = web::Data::new(HealthState::new());
    let config =
        ServerConfig::new(session, bind_addr, db_pool).with_dev_login(settings.dev_login);
    if settings.dev_login {
        warn!("development sign-in is enabled at /api/v1/login");
    }
    let server = create_server(health_state.clone(), config)?;
    let handle = server.handle();

    actix_web::rt::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; draining connections");
            health_state.mark_unhealthy();
            handle.stop(true).await;
        }
    });

    info!(%bind_addr, "listening");
    server.await
}
