//! Generated record types.
//!
//! These types are independent of backend domain types; blood groups are
//! carried as their wire labels and timestamps as day offsets so the caller
//! anchors them to its own clock.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated donor account.
///
/// # Example
///
/// ```
/// use example_data::ExampleUserSeed;
/// use uuid::Uuid;
///
/// let user = ExampleUserSeed {
///     id: Uuid::new_v4(),
///     name: "Ada Lovelace".to_owned(),
///     email: "ada.lovelace1@example.com".to_owned(),
///     phone: "9000000001".to_owned(),
///     blood_group: "O+".to_owned(),
///     days_ago: 12,
/// };
///
/// assert_eq!(user.blood_group, "O+");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleUserSeed {
    /// Unique identifier for the user.
    pub id: Uuid,
    /// Person name.
    pub name: String,
    /// Unique, lower-case email address.
    pub email: String,
    /// Contact phone, digits only.
    pub phone: String,
    /// Blood group label, e.g. `"AB-"`.
    pub blood_group: String,
    /// Account age in days.
    pub days_ago: u32,
}

/// A generated donation, owned by one of the generated users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleDonationSeed {
    /// Ledger entry identifier.
    pub id: Uuid,
    /// Donor identifier.
    pub user_id: Uuid,
    /// Donated blood group label; always the donor's own group.
    pub blood_group: String,
    /// Donated units.
    pub quantity: u8,
    /// Donor phone.
    pub phone: String,
    /// Donation age in days.
    pub days_ago: u32,
}

/// Status of a generated blood request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatusSeed {
    /// Awaiting a decision.
    #[default]
    Pending,
    /// Approved; the request carries a ledger entry id.
    Granted,
}

/// A generated blood request, owned by one of the generated users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleRequestSeed {
    /// Request identifier.
    pub id: Uuid,
    /// Requester identifier.
    pub user_id: Uuid,
    /// Patient name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Requested blood group label.
    pub blood_group: String,
    /// Requested units.
    pub quantity: u8,
    /// Request status.
    pub status: RequestStatusSeed,
    /// Identifier for the `OUT` ledger entry; set exactly when granted.
    pub ledger_entry_id: Option<Uuid>,
    /// Request age in days.
    pub days_ago: u32,
}

/// Everything generated for one seed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleDataset {
    /// Donor accounts.
    pub users: Vec<ExampleUserSeed>,
    /// Donations.
    pub donations: Vec<ExampleDonationSeed>,
    /// Blood requests.
    pub requests: Vec<ExampleRequestSeed>,
}
