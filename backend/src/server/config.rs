//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use bloodbank::inbound::http::session_config::SessionSettings;
use bloodbank::outbound::persistence::DbPool;

/// Everything `create_server` needs: session cookie settings, the listen
/// address, the shared pool and whether development sign-in is mounted.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) dev_login: bool,
}

impl ServerConfig {
    /// Construct a server configuration around an already built pool.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, db_pool: DbPool) -> Self {
        Self {
            session,
            bind_addr,
            db_pool,
            dev_login: false,
        }
    }

    /// Mount `POST /api/v1/login`.
    #[must_use]
    pub fn with_dev_login(mut self, enabled: bool) -> Self {
        self.dev_login = enabled;
        self
    }
}
