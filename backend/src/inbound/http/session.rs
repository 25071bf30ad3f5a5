//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The session cookie is private (signed and encrypted) and carries only the
//! signed-in user's id. [`SessionContext`] writes and clears that claim; the
//! [`Principal`] extractor looks the account's current role up once per
//! request and caches the result in the request extensions, so a role change
//! applies to the very next request.

use actix_session::{Session, SessionExt};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, Principal, UserId};
use crate::inbound::http::state::HttpState;

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the session cookie to `user_id`.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(USER_ID_KEY, user_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Decode the signed-in user's id, if a valid session is present.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match raw.parse::<UserId>() {
            Ok(user_id) => Ok(Some(user_id)),
            Err(_) => {
                warn!("invalid user id in session cookie");
                Ok(None)
            }
        }
    }

    /// Require a signed-in user or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every claim and expire the cookie.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

/// Resolve the caller from the session and the stored account, at most once
/// per request.
async fn resolve_principal(req: HttpRequest) -> Result<Principal, Error> {
    if let Some(principal) = req.extensions().get::<Principal>() {
        return Ok(*principal);
    }
    let user_id = SessionContext::new(req.get_session()).require_user_id()?;
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let Some(principal) = state.principals.resolve(&user_id).await? else {
        warn!(%user_id, "session refers to a missing account");
        return Err(Error::unauthorized("login required"));
    };
    req.extensions_mut().insert(principal);
    Ok(principal)
}

impl FromRequest for Principal {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        Box::pin(resolve_principal(req.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use chrono::Utc;

    use crate::domain::{Email, Role, SignInIdentity, User, UserName};
    use crate::test_support::InMemoryStore;

    fn stored_user(store: &InMemoryStore, role: Role) -> User {
        let identity = SignInIdentity {
            email: Email::new("session@bloodbank.test").expect("valid email"),
            name: UserName::new("Session User").expect("valid name"),
            profile_image: None,
        };
        let mut user = User::register(identity, Utc::now());
        user.role = role;
        store.put_user(user.clone());
        user
    }

    fn session_test_app(
        store: &Arc<InMemoryStore>,
        user_id: UserId,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(store.http_state()))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .route(
                "/set",
                web::get().to(move |session: SessionContext| async move {
                    session.persist_user(&user_id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/whoami",
                web::get().to(|principal: Principal| async move {
                    HttpResponse::Ok().body(format!("{} {}", principal.user_id(), principal.role()))
                }),
            )
            .route(
                "/clear",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/set-invalid",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "not-a-uuid")
                        .expect("set invalid user id");
                    HttpResponse::Ok()
                }),
            )
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
        assert_eq!(res.status(), StatusCode::OK);
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .expect("session cookie set")
    }

    async fn whoami<S>(app: &S, cookie: actix_web::cookie::Cookie<'static>) -> (StatusCode, String)
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse,
                Error = actix_web::Error,
            >,
    {
        let res = test::call_service(
            app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[actix_web::test]
    async fn resolves_the_stored_role_for_the_session_user() {
        let store = Arc::new(InMemoryStore::new());
        let user = stored_user(&store, Role::Admin);
        let app = test::init_service(session_test_app(&store, user.id)).await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;

        let (status, body) = whoami(&app, session_cookie(&set)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{} admin", user.id));
    }

    #[actix_web::test]
    async fn role_changes_apply_to_existing_sessions() {
        let store = Arc::new(InMemoryStore::new());
        let mut user = stored_user(&store, Role::Admin);
        let app = test::init_service(session_test_app(&store, user.id)).await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set);

        user.role = Role::Regular;
        store.put_user(user.clone());
        let (status, body) = whoami(&app, cookie).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{} regular", user.id));
    }

    #[actix_web::test]
    async fn sessions_for_missing_accounts_are_unauthorised() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(session_test_app(&store, UserId::random())).await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;

        let (status, _) = whoami(&app, session_cookie(&set)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn missing_session_is_unauthorised() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(session_test_app(&store, UserId::random())).await;

        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn tampered_claims_are_unauthorised() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(session_test_app(&store, UserId::random())).await;
        let set = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;

        let (status, _) = whoami(&app, session_cookie(&set)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn clearing_expires_the_cookie() {
        let store = Arc::new(InMemoryStore::new());
        let app = test::init_service(session_test_app(&store, UserId::random())).await;
        let set = test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/clear")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let removal = session_cookie(&res);
        assert!(removal.value().is_empty());
    }

    #[actix_web::test]
    async fn principal_is_cached_in_extensions() {
        let req = test::TestRequest::default().to_http_request();
        let cached = Principal::new(UserId::random(), Role::Regular);
        req.extensions_mut().insert(cached);

        let resolved = resolve_principal(req).await.expect("cached principal");
        assert_eq!(resolved, cached);
    }
}
