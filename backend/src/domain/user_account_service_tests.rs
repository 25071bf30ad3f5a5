//! Tests for the user account service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockUserRepository;
use crate::domain::service_test_helpers::{
    admin, donor, fixture_clock, fixture_timestamp, identity, user_for,
};
use crate::domain::{BloodGroup, PhoneNumber};

fn service(repo: MockUserRepository) -> UserAccountService<MockUserRepository> {
    UserAccountService::new(Arc::new(repo), fixture_clock())
}

#[tokio::test]
async fn sign_in_returns_existing_account() {
    let principal = donor();
    let existing = user_for(&principal);
    let returned = existing.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(returned)));
    repo.expect_insert().times(0);

    let user = service(repo)
        .sign_in(identity("donor@example.com"))
        .await
        .expect("sign in");

    assert_eq!(user, existing);
}

#[tokio::test]
async fn first_sign_in_registers_a_regular_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).return_once(|_| Ok(None));
    repo.expect_insert().times(1).return_once(|_| Ok(()));

    let user = service(repo)
        .sign_in(identity("New.Donor@Example.com"))
        .await
        .expect("sign in");

    assert_eq!(user.email.as_ref(), "new.donor@example.com");
    assert_eq!(user.role, Role::Regular);
    assert_eq!(user.blood_group, BloodGroup::ONegative);
    assert_eq!(user.created_at, fixture_timestamp());
}

#[tokio::test]
async fn concurrent_first_sign_in_falls_back_to_the_winning_row() {
    let winner = user_for(&donor());
    let returned = winner.clone();

    let mut repo = MockUserRepository::new();
    let mut lookups = 0;
    repo.expect_find_by_email().times(2).returning(move |_| {
        lookups += 1;
        Ok((lookups > 1).then(|| returned.clone()))
    });
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::duplicate_email("donor@example.com")));

    let user = service(repo)
        .sign_in(identity("donor@example.com"))
        .await
        .expect("sign in");

    assert_eq!(user.id, winner.id);
}

#[rstest]
#[case(UserPersistenceError::connection("pool exhausted"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax error"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_failures_are_mapped(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .times(1)
        .return_once(move |_| Err(failure));

    let err = service(repo)
        .sign_in(identity("donor@example.com"))
        .await
        .expect_err("repository failure");

    assert_eq!(err.code(), expected);
}

#[tokio::test]
async fn profile_for_missing_account_is_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = service(repo)
        .profile(&donor())
        .await
        .expect_err("missing user");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn update_profile_persists_only_whitelisted_changes() {
    let principal = donor();
    let stored = user_for(&principal);

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(*principal.user_id()))
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_update_profile()
        .withf(|user| {
            user.blood_group == BloodGroup::AbNegative
                && user.phone.as_ref().map(AsRef::as_ref) == Some("9876543210")
                && user.role == Role::Regular
        })
        .times(1)
        .return_once(|_| Ok(()));

    let update = ProfileUpdate {
        blood_group: Some(BloodGroup::AbNegative),
        phone: Some(PhoneNumber::new("9876543210").expect("phone")),
        ..ProfileUpdate::default()
    };
    let user = service(repo)
        .update_profile(&principal, update)
        .await
        .expect("update");

    assert_eq!(user.blood_group, BloodGroup::AbNegative);
    assert_eq!(user.updated_at, fixture_timestamp());
}

#[tokio::test]
async fn empty_profile_update_skips_the_write() {
    let principal = donor();
    let stored = user_for(&principal);

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));
    repo.expect_update_profile().times(0);

    service(repo)
        .update_profile(&principal, ProfileUpdate::default())
        .await
        .expect("no-op update");
}

#[tokio::test]
async fn listing_users_requires_admin() {
    let mut repo = MockUserRepository::new();
    repo.expect_list().times(0);

    let err = service(repo)
        .list_users(&donor())
        .await
        .expect_err("regular users cannot list");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn admins_can_list_users() {
    let users = vec![user_for(&donor()), user_for(&admin())];
    let returned = users.clone();

    let mut repo = MockUserRepository::new();
    repo.expect_list().times(1).return_once(move || Ok(returned));

    let listed = service(repo).list_users(&admin()).await.expect("list");

    assert_eq!(listed, users);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(ErrorCode::NotFound))]
#[tokio::test]
async fn assign_role_reports_unknown_users(
    #[case] exists: bool,
    #[case] expected: Option<ErrorCode>,
) {
    let target = UserId::random();
    let mut repo = MockUserRepository::new();
    repo.expect_set_role()
        .withf(move |id, role, _| *id == target && *role == Role::Admin)
        .times(1)
        .return_once(move |_, _, _| Ok(exists));

    let result = service(repo)
        .assign_role(&admin(), target, Role::Admin)
        .await;

    assert_eq!(result.err().map(|err| err.code()), expected);
}

#[tokio::test]
async fn assign_role_requires_admin() {
    let mut repo = MockUserRepository::new();
    repo.expect_set_role().times(0);

    let err = service(repo)
        .assign_role(&donor(), UserId::random(), Role::Admin)
        .await
        .expect_err("regular users cannot assign roles");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn resolved_callers_carry_the_stored_role() {
    let signed_in_as_admin = admin();
    let mut demoted = user_for(&signed_in_as_admin);
    demoted.role = Role::Regular;

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(*signed_in_as_admin.user_id()))
        .times(1)
        .return_once(move |_| Ok(Some(demoted)));

    let resolved = service(repo)
        .resolve(signed_in_as_admin.user_id())
        .await
        .expect("resolve")
        .expect("account exists");

    assert_eq!(resolved.user_id(), signed_in_as_admin.user_id());
    assert_eq!(resolved.role(), Role::Regular);
}

#[tokio::test]
async fn removed_accounts_resolve_to_no_caller() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let resolved = service(repo)
        .resolve(&UserId::random())
        .await
        .expect("resolve");

    assert_eq!(resolved, None);
}
