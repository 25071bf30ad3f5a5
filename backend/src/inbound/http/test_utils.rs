//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};

use crate::inbound::http::session_config::SessionSettings;

/// Production session middleware with a fresh key and the `Secure` flag off
/// so plain-HTTP test requests keep their cookie.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    }
    .middleware()
}
