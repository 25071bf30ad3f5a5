//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed blood bank entities used by the API and
//! persistence layers, and the services that implement the driving ports.
//! Types validate on construction, so adapters hand services nothing but
//! well-formed values.
//!
//! Public surface:
//! - `BloodGroup`, `Quantity`, `PhoneNumber`: validated scalar values.
//! - `User`, `Principal`: accounts and the caller behind a request.
//! - `LedgerEntry`: append-only movements of blood units.
//! - `RequestGrant`, `TransitionPlan`: grant requests and the status machine.
//! - `InventoryStats`, `DonationSummary`: read models built from the ledger.
//! - `Error`, `ErrorCode`: transport agnostic failure payload.

pub mod auth;
pub mod blood;
pub mod donation_summary;
pub mod error;
pub mod grant;
pub mod inventory;
pub mod ledger;
pub mod ports;
pub mod trace_id;
pub mod user;

mod donation_service;
#[cfg(feature = "example-data")]
mod example_data;
mod grant_request_service;
mod inventory_service;
#[cfg(test)]
mod service_test_helpers;
mod user_account_service;

pub use self::auth::Principal;
pub use self::blood::{
    BloodGroup, BloodGroupParseError, PhoneNumber, PhoneNumberError, QUANTITY_MAX, QUANTITY_MIN,
    Quantity, QuantityError,
};
pub use self::donation_service::DonationService;
pub use self::donation_summary::{DonationRecord, DonationSummary, DonationTotals, GroupDonations};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
#[cfg(feature = "example-data")]
pub use self::example_data::{
    ExampleDataSeedOutcome, ExampleDataSeeder, ExampleDataSeedingError, SeedCountOverrides,
};
pub use self::grant::{
    ALLOWED_TRANSITIONS, GrantRequestDraft, GrantStatus, GrantStatusError, LedgerEffect,
    RequestGrant, TransitionError, TransitionPlan, is_allowed_transition,
};
pub use self::grant_request_service::{GrantRequestService, MAX_TRANSITION_ATTEMPTS};
pub use self::inventory::{
    BloodGroupInventory, FlowStats, InventoryStats, InventorySummary, InventoryTallies, LedgerTally,
    RequestStats, RequestTally,
};
pub use self::inventory_service::InventoryService;
pub use self::ledger::{Direction, DonationDraft, LedgerEntry, LedgerLabelError, LedgerSource};
pub use self::trace_id::TraceId;
pub use self::user::{
    DEFAULT_BLOOD_GROUP, Email, ProfileUpdate, Role, SignInIdentity, USER_NAME_MAX, User, UserId,
    UserName, UserValidationError,
};
pub use self::user_account_service::UserAccountService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use bloodbank::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::unauthorized("admin role required"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
