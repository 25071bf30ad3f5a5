//! Grant and ledger behaviour against a real PostgreSQL database.
//!
//! Set `BLOODBANK_TEST_DATABASE_URL` to a disposable database to run these
//! tests; they skip otherwise. Each test works on freshly created users and
//! grants so runs do not interfere with each other.

use std::sync::Arc;

use bloodbank::domain::ports::{
    GrantRepository, GrantRequestCommand, GrantTransitionCommand, GrantTransitionRequest,
    InventoryStatsQuery, LoginService,
};
use bloodbank::domain::{
    BloodGroup, Email, ErrorCode, GrantRequestDraft, GrantRequestService, GrantStatus,
    InventoryService, PhoneNumber, Principal, Quantity, RequestGrant, Role, SignInIdentity,
    UserAccountService, UserName,
};
use bloodbank::outbound::persistence::{
    DbPool, DieselGrantRepository, DieselInventoryRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use mockable::DefaultClock;
use rstest::rstest;
use uuid::Uuid;

const DATABASE_URL_ENV: &str = "BLOODBANK_TEST_DATABASE_URL";

struct Harness {
    pool: DbPool,
    accounts: UserAccountService<DieselUserRepository>,
    grants: Arc<GrantRequestService<DieselGrantRepository>>,
}

async fn harness() -> Option<Harness> {
    let Ok(url) = std::env::var(DATABASE_URL_ENV) else {
        eprintln!("SKIP-TEST-CLUSTER: {DATABASE_URL_ENV} not set");
        return None;
    };
    run_pending_migrations(&url).await.expect("migrations apply");
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(4))
        .await
        .expect("pool builds");
    let clock = Arc::new(DefaultClock);
    Some(Harness {
        accounts: UserAccountService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            clock.clone(),
        ),
        grants: Arc::new(GrantRequestService::new(
            Arc::new(DieselGrantRepository::new(pool.clone())),
            clock,
        )),
        pool,
    })
}

impl Harness {
    async fn principal(&self, role: Role) -> Principal {
        let identity = SignInIdentity {
            email: Email::new(format!("{}@bloodbank.test", Uuid::new_v4())).expect("email"),
            name: UserName::new("Postgres Test").expect("name"),
            profile_image: None,
        };
        let user = self.accounts.sign_in(identity).await.expect("sign in");
        Principal::new(user.id, role)
    }

    async fn pending_grant(
        &self,
        owner: &Principal,
        group: BloodGroup,
        units: i64,
    ) -> RequestGrant {
        let draft = GrantRequestDraft {
            name: UserName::new("Ward 3").expect("name"),
            phone: PhoneNumber::new("9000000003").expect("phone"),
            blood_group: group,
            quantity: Quantity::new(units).expect("quantity"),
        };
        self.grants
            .submit_request(owner, draft)
            .await
            .expect("submit")
    }

    async fn transition(
        &self,
        admin: &Principal,
        grant_id: Uuid,
        status: &str,
    ) -> Result<GrantStatus, ErrorCode> {
        self.grants
            .transition(
                admin,
                GrantTransitionRequest {
                    grant_id: grant_id.to_string(),
                    requested_status: status.to_owned(),
                },
            )
            .await
            .map(|outcome| outcome.status)
            .map_err(|error| error.code())
    }

    async fn stored(&self, grant_id: Uuid) -> RequestGrant {
        DieselGrantRepository::new(self.pool.clone())
            .find_by_id(&grant_id)
            .await
            .expect("lookup")
            .expect("grant stored")
    }
}

#[rstest]
#[tokio::test]
async fn grant_then_reject_links_and_unlinks_the_ledger_entry() {
    let Some(harness) = harness().await else {
        return;
    };
    let donor = harness.principal(Role::Regular).await;
    let admin = harness.principal(Role::Admin).await;
    let grant = harness.pending_grant(&donor, BloodGroup::ANegative, 5).await;

    assert_eq!(
        harness.transition(&admin, grant.id, "granted").await,
        Ok(GrantStatus::Granted)
    );
    let granted = harness.stored(grant.id).await;
    assert!(granted.ledger_entry_id.is_some());
    assert_eq!(granted.revision, grant.revision + 1);

    assert_eq!(
        harness.transition(&admin, grant.id, "rejected").await,
        Ok(GrantStatus::Rejected)
    );
    let rejected = harness.stored(grant.id).await;
    assert_eq!(rejected.ledger_entry_id, None);
    assert_eq!(
        harness.transition(&admin, grant.id, "pending").await,
        Ok(GrantStatus::Pending)
    );
}

#[rstest]
#[tokio::test]
async fn granted_to_pending_is_refused_without_side_effects() {
    let Some(harness) = harness().await else {
        return;
    };
    let donor = harness.principal(Role::Regular).await;
    let admin = harness.principal(Role::Admin).await;
    let grant = harness.pending_grant(&donor, BloodGroup::ANegative, 2).await;
    harness
        .transition(&admin, grant.id, "granted")
        .await
        .expect("grant");
    let before = harness.stored(grant.id).await;

    let refused = harness.transition(&admin, grant.id, "pending").await;

    assert_eq!(refused, Err(ErrorCode::InvalidTransition));
    assert_eq!(harness.stored(grant.id).await, before);
}

/// Only the concurrency test touches `AB-`, so its delta is not disturbed by
/// tests running in parallel.
async fn ab_negative_out(
    inventory: &InventoryService<DieselInventoryRepository>,
    admin: &Principal,
) -> i64 {
    inventory
        .inventory_stats(admin)
        .await
        .expect("stats")
        .by_blood_group
        .get(&BloodGroup::AbNegative)
        .map_or(0, |group| group.outflow.quantity)
}

#[rstest]
#[tokio::test]
async fn concurrent_grants_materialise_exactly_one_entry() {
    let Some(harness) = harness().await else {
        return;
    };
    let donor = harness.principal(Role::Regular).await;
    let admin = harness.principal(Role::Admin).await;
    let grant = harness.pending_grant(&donor, BloodGroup::AbNegative, 7).await;
    let inventory = InventoryService::new(Arc::new(DieselInventoryRepository::new(
        harness.pool.clone(),
    )));
    let out_before = ab_negative_out(&inventory, &admin).await;

    let attempts = (0..4).map(|_| {
        let grants = harness.grants.clone();
        let request = GrantTransitionRequest {
            grant_id: grant.id.to_string(),
            requested_status: "granted".to_owned(),
        };
        tokio::spawn(async move { grants.transition(&admin, request).await })
    });
    for attempt in futures_util::future::join_all(attempts).await {
        let outcome = attempt.expect("task joins");
        assert!(
            matches!(&outcome, Ok(response) if response.status == GrantStatus::Granted)
                || matches!(&outcome, Err(error) if error.code() == ErrorCode::Conflict),
            "unexpected outcome {outcome:?}"
        );
    }

    let out_after = ab_negative_out(&inventory, &admin).await;
    assert_eq!(out_after - out_before, 7);
    assert!(harness.stored(grant.id).await.ledger_entry_id.is_some());
}

#[rstest]
#[tokio::test]
async fn inventory_reports_never_split_a_grant_commit() {
    let Some(harness) = harness().await else {
        return;
    };
    let donor = harness.principal(Role::Regular).await;
    let admin = harness.principal(Role::Admin).await;
    let mut grant_ids = Vec::new();
    for units in [3, 4, 6] {
        grant_ids.push(harness.pending_grant(&donor, BloodGroup::BNegative, units).await.id);
    }
    let inventory = InventoryService::new(Arc::new(DieselInventoryRepository::new(
        harness.pool.clone(),
    )));

    let grants = harness.grants.clone();
    let toggler = tokio::spawn(async move {
        for status in ["granted", "rejected", "granted", "rejected"] {
            for grant_id in &grant_ids {
                let request = GrantTransitionRequest {
                    grant_id: grant_id.to_string(),
                    requested_status: status.to_owned(),
                };
                grants.transition(&admin, request).await.expect("transition");
            }
        }
    });

    while !toggler.is_finished() {
        let stats = inventory.inventory_stats(&admin).await.expect("stats");
        if let Some(group) = stats.by_blood_group.get(&BloodGroup::BNegative) {
            assert_eq!(
                group.request_stats.total_granted_quantity, group.outflow.quantity,
                "granted requests and OUT entries disagree"
            );
        }
    }
    toggler.await.expect("toggler joins");
}
