//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by persistence adapters;
//! driving ports (commands and queries) are implemented by domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod donation_command;
mod donation_query;
mod example_data_seed_repository;
mod grant_repository;
mod grant_request_command;
mod grant_request_query;
mod grant_transition_command;
mod inventory_repository;
mod inventory_stats_query;
mod ledger_repository;
mod login_service;
mod principal_resolver;
mod user_administration;
mod user_profile_command;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use donation_command::MockDonationCommand;
pub use donation_command::DonationCommand;
#[cfg(test)]
pub use donation_query::MockDonationQuery;
pub use donation_query::DonationQuery;
#[cfg(test)]
pub use example_data_seed_repository::MockExampleDataSeedRepository;
pub use example_data_seed_repository::{
    ExampleDataSeedGrant, ExampleDataSeedRepository, ExampleDataSeedRepositoryError,
    ExampleDataSeedRequest, SeedingResult,
};
#[cfg(test)]
pub use grant_repository::MockGrantRepository;
pub use grant_repository::{GrantRepository, GrantRepositoryError};
#[cfg(test)]
pub use grant_request_command::MockGrantRequestCommand;
pub use grant_request_command::GrantRequestCommand;
#[cfg(test)]
pub use grant_request_query::MockGrantRequestQuery;
pub use grant_request_query::GrantRequestQuery;
#[cfg(test)]
pub use grant_transition_command::MockGrantTransitionCommand;
pub use grant_transition_command::{
    GrantTransitionCommand, GrantTransitionRequest, GrantTransitionResponse,
};
#[cfg(test)]
pub use inventory_repository::MockInventoryRepository;
pub use inventory_repository::{InventoryRepository, InventoryRepositoryError};
#[cfg(test)]
pub use inventory_stats_query::MockInventoryStatsQuery;
pub use inventory_stats_query::InventoryStatsQuery;
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{LedgerRepository, LedgerRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::LoginService;
#[cfg(test)]
pub use principal_resolver::MockPrincipalResolver;
pub use principal_resolver::PrincipalResolver;
#[cfg(test)]
pub use user_administration::MockUserAdministration;
pub use user_administration::UserAdministration;
#[cfg(test)]
pub use user_profile_command::MockUserProfileCommand;
pub use user_profile_command::UserProfileCommand;
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
