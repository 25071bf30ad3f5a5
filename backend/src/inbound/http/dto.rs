//! Response bodies shared by several handlers.
//!
//! Domain aggregates stay serde-free where their wire shape differs from
//! their Rust shape; these DTOs fix the camelCase JSON contract in one place.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    BloodGroup, Direction, GrantStatus, LedgerEntry, LedgerSource, RequestGrant, Role, User,
};

/// Account as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// Stable user identifier.
    pub id: Uuid,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    /// Sign-in email, lower case.
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Blood group label.
    #[schema(value_type = String, example = "O-")]
    pub blood_group: BloodGroup,
    /// Free-text medical history.
    pub medical_history: Option<String>,
    /// Avatar URL.
    pub profile_image: Option<String>,
    /// `admin` or `regular`.
    #[schema(value_type = String, example = "regular")]
    pub role: Role,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            phone: user.phone.map(|phone| phone.as_ref().to_owned()),
            blood_group: user.blood_group,
            medical_history: user.medical_history,
            profile_image: user.profile_image,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Ledger movement as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// `IN` or `OUT`.
    #[serde(rename = "type")]
    #[schema(value_type = String, example = "IN")]
    pub direction: Direction,
    /// Blood group label.
    #[schema(value_type = String, example = "O+")]
    pub blood_group: BloodGroup,
    /// Units moved.
    #[schema(example = 50)]
    pub quantity: u8,
    /// Contact phone captured with the movement.
    pub phone: Option<String>,
    /// `DONATION` or `REQUEST`.
    #[schema(value_type = Option<String>, example = "DONATION")]
    pub source: Option<LedgerSource>,
    /// Grant that materialized the entry.
    pub request_grant_id: Option<Uuid>,
    /// Recording time.
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryResponse {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            user_id: *entry.user_id.as_uuid(),
            direction: entry.direction,
            blood_group: entry.blood_group,
            quantity: entry.quantity.get(),
            phone: entry.phone.map(|phone| phone.as_ref().to_owned()),
            source: entry.source,
            request_grant_id: entry.request_grant_id,
            created_at: entry.created_at,
        }
    }
}

/// Grant request as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestGrantResponse {
    /// Grant identifier.
    pub id: Uuid,
    /// Requesting user.
    pub user_id: Uuid,
    /// Patient or requester name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Requested blood group label.
    #[schema(value_type = String, example = "A-")]
    pub blood_group: BloodGroup,
    /// Requested units.
    #[schema(example = 20)]
    pub quantity: u8,
    /// `pending`, `granted` or `rejected`.
    #[schema(value_type = String, example = "pending")]
    pub status: GrantStatus,
    /// Whether an `OUT` ledger entry exists for this grant.
    pub blood_transaction_created: bool,
    /// The linked `OUT` ledger entry.
    pub ledger_entry_id: Option<Uuid>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last transition.
    pub updated_at: DateTime<Utc>,
}

impl From<RequestGrant> for RequestGrantResponse {
    fn from(grant: RequestGrant) -> Self {
        Self {
            id: grant.id,
            user_id: *grant.user_id.as_uuid(),
            blood_transaction_created: grant.is_materialized(),
            name: grant.name.to_string(),
            phone: grant.phone.as_ref().to_owned(),
            blood_group: grant.blood_group,
            quantity: grant.quantity.get(),
            status: grant.status,
            ledger_entry_id: grant.ledger_entry_id,
            created_at: grant.created_at,
            updated_at: grant.updated_at,
        }
    }
}
