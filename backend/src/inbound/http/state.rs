//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DonationCommand, DonationQuery, GrantRequestCommand, GrantRequestQuery,
    GrantTransitionCommand, InventoryStatsQuery, LoginService, PrincipalResolver,
    UserAdministration, UserProfileCommand, UserProfileQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Sign-in.
    pub login: Arc<dyn LoginService>,
    /// Session user to caller, with the stored role.
    pub principals: Arc<dyn PrincipalResolver>,
    /// Profile reads.
    pub profile: Arc<dyn UserProfileQuery>,
    /// Profile updates.
    pub profile_command: Arc<dyn UserProfileCommand>,
    /// Admin user listing and role changes.
    pub user_admin: Arc<dyn UserAdministration>,
    /// Donation recording.
    pub donations: Arc<dyn DonationCommand>,
    /// Donation summary.
    pub donations_query: Arc<dyn DonationQuery>,
    /// Grant submission.
    pub grant_requests: Arc<dyn GrantRequestCommand>,
    /// Grant listing.
    pub grant_requests_query: Arc<dyn GrantRequestQuery>,
    /// Admin grant transitions.
    pub grant_transitions: Arc<dyn GrantTransitionCommand>,
    /// Inventory statistics.
    pub inventory: Arc<dyn InventoryStatsQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sign-in.
    pub login: Arc<dyn LoginService>,
    /// Session user to caller, with the stored role.
    pub principals: Arc<dyn PrincipalResolver>,
    /// Profile reads.
    pub profile: Arc<dyn UserProfileQuery>,
    /// Profile updates.
    pub profile_command: Arc<dyn UserProfileCommand>,
    /// Admin user listing and role changes.
    pub user_admin: Arc<dyn UserAdministration>,
    /// Donation recording.
    pub donations: Arc<dyn DonationCommand>,
    /// Donation summary.
    pub donations_query: Arc<dyn DonationQuery>,
    /// Grant submission.
    pub grant_requests: Arc<dyn GrantRequestCommand>,
    /// Grant listing.
    pub grant_requests_query: Arc<dyn GrantRequestQuery>,
    /// Admin grant transitions.
    pub grant_transitions: Arc<dyn GrantTransitionCommand>,
    /// Inventory statistics.
    pub inventory: Arc<dyn InventoryStatsQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use bloodbank::inbound::http::state::HttpState;
    /// use bloodbank::test_support::InMemoryStore;
    ///
    /// let store = Arc::new(InMemoryStore::new());
    /// let state: HttpState = store.http_state();
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            principals,
            profile,
            profile_command,
            user_admin,
            donations,
            donations_query,
            grant_requests,
            grant_requests_query,
            grant_transitions,
            inventory,
        } = ports;
        Self {
            login,
            principals,
            profile,
            profile_command,
            user_admin,
            donations,
            donations_query,
            grant_requests,
            grant_requests_query,
            grant_transitions,
            inventory,
        }
    }
}
