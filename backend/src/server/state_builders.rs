//! Builds the HTTP port bundle from Diesel repositories and domain services.

use std::sync::Arc;

use bloodbank::domain::{DonationService, GrantRequestService, InventoryService, UserAccountService};
use bloodbank::inbound::http::state::{HttpState, HttpStatePorts};
use bloodbank::outbound::persistence::{
    DbPool, DieselGrantRepository, DieselInventoryRepository, DieselLedgerRepository,
    DieselUserRepository,
};
use mockable::Clock;

/// Wire every driving port onto a repository sharing `pool`.
///
/// One service instance backs all the ports it implements, so the login,
/// profile and admin ports see the same user repository.
pub(crate) fn build_http_state(pool: &DbPool, clock: Arc<dyn Clock>) -> HttpState {
    let accounts = Arc::new(UserAccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        clock.clone(),
    ));
    let donations = Arc::new(DonationService::new(
        Arc::new(DieselLedgerRepository::new(pool.clone())),
        clock.clone(),
    ));
    let grants = Arc::new(GrantRequestService::new(
        Arc::new(DieselGrantRepository::new(pool.clone())),
        clock,
    ));
    let inventory = Arc::new(InventoryService::new(Arc::new(
        DieselInventoryRepository::new(pool.clone()),
    )));

    HttpState::new(HttpStatePorts {
        login: accounts.clone(),
        principals: accounts.clone(),
        profile: accounts.clone(),
        profile_command: accounts.clone(),
        user_admin: accounts,
        donations: donations.clone(),
        donations_query: donations,
        grant_requests: grants.clone(),
        grant_requests_query: grants.clone(),
        grant_transitions: grants,
        inventory,
    })
}
