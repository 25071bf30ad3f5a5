//! End-to-end HTTP workflows over the in-memory store.
//!
//! Requests go through the real session middleware: each test signs in via
//! `POST /api/v1/login` and replays the returned cookie, so the admin check
//! runs against the stored role of the session's user rather than an
//! injected principal.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use bloodbank::Trace;
use bloodbank::domain::{Email, Role, SignInIdentity, User, UserName};
use bloodbank::inbound::http::configure_api;
use bloodbank::inbound::http::test_utils::test_session_middleware;
use bloodbank::test_support::InMemoryStore;
use chrono::Utc;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@bloodbank.test";
const DONOR_EMAIL: &str = "donor@bloodbank.test";

fn provision_admin(store: &InMemoryStore) {
    let identity = SignInIdentity {
        email: Email::new(ADMIN_EMAIL).expect("valid email"),
        name: UserName::new("Bank Admin").expect("valid name"),
        profile_image: None,
    };
    let mut admin = User::register(identity, Utc::now());
    admin.role = Role::Admin;
    store.put_user(admin);
}

async fn app(
    store: &Arc<InMemoryStore>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(store.http_state()))
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .wrap(test_session_middleware())
                    .configure(|cfg| configure_api(cfg, true)),
            ),
    )
    .await
}

async fn sign_in<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email, "name": "Test Person" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie")
}

async fn send<S>(app: &S, req: test::TestRequest, cookie: &Cookie<'static>) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, req.cookie(cookie.clone()).to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("json body")
    };
    (status, json)
}

async fn submit_request<S>(app: &S, cookie: &Cookie<'static>, group: &str, quantity: u8) -> Uuid
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::post().uri("/api/v1/request").set_json(json!({
            "name": "Ward 7",
            "phone": "9000000001",
            "bloodGroup": group,
            "quantity": quantity
        })),
        cookie,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body.pointer("/request/id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
        .expect("request id")
}

async fn transition<S>(
    app: &S,
    cookie: &Cookie<'static>,
    grant_id: Uuid,
    status: &str,
) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    send(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/admin/requests/grant/{grant_id}"))
            .set_json(json!({ "status": status })),
        cookie,
    )
    .await
}

#[rstest]
#[actix_web::test]
async fn donations_roll_up_into_the_donor_summary() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;

    for (group, quantity) in [("O+", 2), ("O+", 3), ("B-", 1)] {
        let (status, body) = send(
            &app,
            test::TestRequest::post().uri("/api/v1/donation").set_json(json!({
                "bloodGroup": group,
                "quantity": quantity,
                "phone": "9000000002"
            })),
            &donor,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body.pointer("/donation/type"), Some(&json!("IN")));
    }

    let (status, body) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/donation?desc=summary"),
        &donor,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.pointer("/data/summary/totalQuantityOfDonations"),
        Some(&json!(6))
    );
    assert_eq!(
        body.pointer("/data/summary/totalDonationsCount"),
        Some(&json!(3))
    );
    let breakdown = body
        .pointer("/data/groupWiseBreakdown")
        .and_then(Value::as_array)
        .expect("breakdown");
    assert_eq!(breakdown.len(), 8);
}

#[rstest]
#[actix_web::test]
async fn granting_a_request_moves_stock_out_of_inventory() {
    let store = Arc::new(InMemoryStore::new());
    provision_admin(&store);
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;
    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let grant_id = submit_request(&app, &donor, "A-", 20).await;

    let (status, body) = transition(&app, &admin, grant_id, "granted").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body.pointer("/data/status"), Some(&json!("granted")));

    let (status, stats) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/admin/inventory-stats"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats.pointer("/data/byBloodGroup/A-/out/quantity"),
        Some(&json!(20))
    );
    assert_eq!(
        stats.pointer("/data/summary/totalOutQuantity"),
        Some(&json!(20))
    );
    assert_eq!(store.out_entries_for(grant_id).len(), 1);
}

#[rstest]
#[actix_web::test]
async fn repeating_a_grant_keeps_a_single_ledger_entry() {
    let store = Arc::new(InMemoryStore::new());
    provision_admin(&store);
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;
    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let grant_id = submit_request(&app, &donor, "AB+", 4).await;

    for _ in 0..2 {
        let (status, _) = transition(&app, &admin, grant_id, "granted").await;
        assert_eq!(status, StatusCode::OK);
    }

    let entries = store.out_entries_for(grant_id);
    assert_eq!(entries.len(), 1);
    let grant = store.grant(grant_id).expect("grant stored");
    assert_eq!(grant.ledger_entry_id, entries.first().map(|entry| entry.id));
}

#[rstest]
#[actix_web::test]
async fn rejecting_a_granted_request_retracts_its_ledger_entry() {
    let store = Arc::new(InMemoryStore::new());
    provision_admin(&store);
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;
    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let grant_id = submit_request(&app, &donor, "O-", 3).await;

    let (granted, _) = transition(&app, &admin, grant_id, "granted").await;
    let (rejected, body) = transition(&app, &admin, grant_id, "rejected").await;

    assert_eq!(granted, StatusCode::OK);
    assert_eq!(rejected, StatusCode::OK, "{body}");
    assert!(store.out_entries_for(grant_id).is_empty());
    let grant = store.grant(grant_id).expect("grant stored");
    assert_eq!(grant.ledger_entry_id, None);

    let (_, listed) = send(&app, test::TestRequest::get().uri("/api/v1/request"), &admin).await;
    let request = listed
        .pointer("/requests")
        .and_then(Value::as_array)
        .and_then(|requests| requests.first())
        .expect("listed request");
    assert_eq!(request.get("status"), Some(&json!("rejected")));
    assert_eq!(request.get("bloodTransactionCreated"), Some(&json!(false)));
}

#[rstest]
#[actix_web::test]
async fn granted_requests_cannot_return_to_pending() {
    let store = Arc::new(InMemoryStore::new());
    provision_admin(&store);
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;
    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let grant_id = submit_request(&app, &donor, "B+", 2).await;
    let _ = transition(&app, &admin, grant_id, "granted").await;

    let (status, body) = transition(&app, &admin, grant_id, "pending").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body.get("code"), Some(&json!("invalid_transition")));
    assert_eq!(store.out_entries_for(grant_id).len(), 1);
}

#[rstest]
#[case("/api/v1/admin/inventory-stats")]
#[case("/api/v1/admin?user=all")]
#[actix_web::test]
async fn regular_users_are_refused_admin_reads(#[case] uri: &str) {
    let store = Arc::new(InMemoryStore::new());
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;

    let (status, body) = send(&app, test::TestRequest::get().uri(uri), &donor).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
}

#[rstest]
#[actix_web::test]
async fn regular_users_cannot_transition_grants() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;
    let grant_id = submit_request(&app, &donor, "A+", 1).await;

    let (status, _) = transition(&app, &donor, grant_id, "granted").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(store.out_entries_for(grant_id).is_empty());
}

#[rstest]
#[actix_web::test]
async fn demoted_admins_lose_access_on_their_next_request() {
    let store = Arc::new(InMemoryStore::new());
    provision_admin(&store);
    let app = app(&store).await;
    let admin = sign_in(&app, ADMIN_EMAIL).await;
    let (_, me) = send(&app, test::TestRequest::get().uri("/api/v1/user"), &admin).await;
    let admin_id = me
        .pointer("/user/id")
        .and_then(Value::as_str)
        .expect("admin id")
        .to_owned();

    let (status, _) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/admin?user=all"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        test::TestRequest::patch()
            .uri("/api/v1/admin")
            .set_json(json!({ "userId": admin_id, "role": "regular" })),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    for uri in ["/api/v1/admin?user=all", "/api/v1/admin/inventory-stats"] {
        let (status, body) = send(&app, test::TestRequest::get().uri(uri), &admin).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}: {body}");
    }
}

#[rstest]
#[actix_web::test]
async fn logging_out_drops_the_session() {
    let store = Arc::new(InMemoryStore::new());
    let app = app(&store).await;
    let donor = sign_in(&app, DONOR_EMAIL).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(donor)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    let cleared = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("removal cookie");

    let (status, _) = send(&app, test::TestRequest::get().uri("/api/v1/user"), &cleared).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
