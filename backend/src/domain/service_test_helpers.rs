//! Shared fixtures for domain service tests.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{
    BloodGroup, Email, GrantRequestDraft, PhoneNumber, Principal, Quantity, Role,
    SignInIdentity, User, UserId, UserName,
};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn admin() -> Principal {
    Principal::new(UserId::random(), Role::Admin)
}

pub(crate) fn donor() -> Principal {
    Principal::new(UserId::random(), Role::Regular)
}

pub(crate) fn identity(email: &str) -> SignInIdentity {
    SignInIdentity {
        email: Email::new(email).expect("fixture email"),
        name: UserName::new("Demo Donor").expect("fixture name"),
        profile_image: None,
    }
}

pub(crate) fn user_for(principal: &Principal) -> User {
    let mut user = User::register(identity("donor@example.com"), fixture_timestamp());
    user.id = *principal.user_id();
    user.role = principal.role();
    user
}

pub(crate) fn grant_draft(blood_group: BloodGroup, units: i64) -> GrantRequestDraft {
    GrantRequestDraft {
        name: UserName::new("Ward 7").expect("fixture name"),
        phone: PhoneNumber::new("9000000001").expect("fixture phone"),
        blood_group,
        quantity: Quantity::new(units).expect("fixture quantity"),
    }
}
