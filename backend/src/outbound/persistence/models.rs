//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Rows convert into domain values through
//! `TryFrom`, re-validating every labelled column so a corrupt row surfaces as
//! a query error instead of an invalid aggregate.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    BloodGroup, Direction, Email, GrantStatus, LedgerEntry, LedgerSource, PhoneNumber, Quantity,
    RequestGrant, Role, User, UserId, UserName,
};

use super::schema::{example_data_seeds, ledger_entries, request_grants, users};

/// A stored row that no longer satisfies the domain invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("corrupt {column} in row {row_id}: {value:?}")]
pub(crate) struct CorruptRow {
    pub row_id: Uuid,
    pub column: &'static str,
    pub value: String,
}

impl CorruptRow {
    fn new(row_id: Uuid, column: &'static str, value: impl ToString) -> Self {
        Self {
            row_id,
            column,
            value: value.to_string(),
        }
    }
}

fn blood_group(row_id: Uuid, raw: &str) -> Result<BloodGroup, CorruptRow> {
    raw.parse()
        .map_err(|_| CorruptRow::new(row_id, "blood_group", raw))
}

fn quantity(row_id: Uuid, raw: i16) -> Result<Quantity, CorruptRow> {
    Quantity::new(i64::from(raw)).map_err(|_| CorruptRow::new(row_id, "quantity", raw))
}

fn phone(row_id: Uuid, raw: String) -> Result<PhoneNumber, CorruptRow> {
    PhoneNumber::new(raw.as_str()).map_err(|_| CorruptRow::new(row_id, "phone", raw))
}

/// Quantities are bounded to `1..=100`, so they always fit a `SMALLINT`.
pub(crate) fn quantity_column(value: Quantity) -> i16 {
    i16::from(value.get())
}

/// Cast a domain revision to the `INTEGER` column, saturating on overflow.
pub(crate) fn revision_column(revision: u32) -> i32 {
    i32::try_from(revision).unwrap_or(i32::MAX)
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub blood_group: String,
    pub medical_history: Option<String>,
    pub profile_image: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CorruptRow;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id: UserId::from_uuid(id),
            name: UserName::new(&row.name).map_err(|_| CorruptRow::new(id, "name", &row.name))?,
            email: Email::new(&row.email)
                .map_err(|_| CorruptRow::new(id, "email", &row.email))?,
            phone: row.phone.map(|raw| phone(id, raw)).transpose()?,
            blood_group: blood_group(id, &row.blood_group)?,
            medical_history: row.medical_history,
            profile_image: row.profile_image,
            role: row
                .role
                .parse::<Role>()
                .map_err(|_| CorruptRow::new(id, "role", &row.role))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub blood_group: &'a str,
    pub medical_history: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub role: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for NewUserRow<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            phone: user.phone.as_ref().map(AsRef::as_ref),
            blood_group: user.blood_group.as_str(),
            medical_history: user.medical_history.as_deref(),
            profile_image: user.profile_image.as_deref(),
            role: user.role.as_str(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Changeset for the self-service profile fields.
///
/// `treat_none_as_null` is off, so `None` leaves a column untouched; the
/// domain never clears a profile field once set.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserProfileUpdate<'a> {
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub blood_group: &'a str,
    pub medical_history: Option<&'a str>,
    pub profile_image: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserProfileUpdate<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            name: user.name.as_ref(),
            phone: user.phone.as_ref().map(AsRef::as_ref),
            blood_group: user.blood_group.as_str(),
            medical_history: user.medical_history.as_deref(),
            profile_image: user.profile_image.as_deref(),
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger models
// ---------------------------------------------------------------------------

/// Row struct for reading from the ledger_entries table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ledger_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LedgerEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub direction: String,
    pub blood_group: String,
    pub quantity: i16,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub request_grant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LedgerEntryRow> for LedgerEntry {
    type Error = CorruptRow;

    fn try_from(row: LedgerEntryRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id,
            user_id: UserId::from_uuid(row.user_id),
            direction: row
                .direction
                .parse::<Direction>()
                .map_err(|_| CorruptRow::new(id, "direction", &row.direction))?,
            blood_group: blood_group(id, &row.blood_group)?,
            quantity: quantity(id, row.quantity)?,
            phone: row.phone.map(|raw| phone(id, raw)).transpose()?,
            source: row
                .source
                .map(|raw| {
                    raw.parse::<LedgerSource>()
                        .map_err(|_| CorruptRow::new(id, "source", &raw))
                })
                .transpose()?,
            request_grant_id: row.request_grant_id,
            created_at: row.created_at,
        })
    }
}

/// Insertable struct for appending ledger entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub(crate) struct NewLedgerEntryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub direction: &'a str,
    pub blood_group: &'a str,
    pub quantity: i16,
    pub phone: Option<&'a str>,
    pub source: Option<&'a str>,
    pub request_grant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl<'a> From<&'a LedgerEntry> for NewLedgerEntryRow<'a> {
    fn from(entry: &'a LedgerEntry) -> Self {
        Self {
            id: entry.id,
            user_id: *entry.user_id.as_uuid(),
            direction: entry.direction.as_str(),
            blood_group: entry.blood_group.as_str(),
            quantity: quantity_column(entry.quantity),
            phone: entry.phone.as_ref().map(AsRef::as_ref),
            source: entry.source.map(LedgerSource::as_str),
            request_grant_id: entry.request_grant_id,
            created_at: entry.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Grant request models
// ---------------------------------------------------------------------------

/// Row struct for reading from the request_grants table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = request_grants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RequestGrantRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub blood_group: String,
    pub quantity: i16,
    pub status: String,
    pub ledger_entry_id: Option<Uuid>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<RequestGrantRow> for RequestGrant {
    type Error = CorruptRow;

    fn try_from(row: RequestGrantRow) -> Result<Self, Self::Error> {
        let id = row.id;
        Ok(Self {
            id,
            user_id: UserId::from_uuid(row.user_id),
            name: UserName::new(&row.name).map_err(|_| CorruptRow::new(id, "name", &row.name))?,
            phone: phone(id, row.phone)?,
            blood_group: blood_group(id, &row.blood_group)?,
            quantity: quantity(id, row.quantity)?,
            status: row
                .status
                .parse::<GrantStatus>()
                .map_err(|_| CorruptRow::new(id, "status", &row.status))?,
            ledger_entry_id: row.ledger_entry_id,
            revision: u32::try_from(row.revision)
                .map_err(|_| CorruptRow::new(id, "revision", row.revision))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating grant requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = request_grants)]
pub(crate) struct NewRequestGrantRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: &'a str,
    pub phone: &'a str,
    pub blood_group: &'a str,
    pub quantity: i16,
    pub status: &'a str,
    pub ledger_entry_id: Option<Uuid>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a RequestGrant> for NewRequestGrantRow<'a> {
    fn from(grant: &'a RequestGrant) -> Self {
        Self {
            id: grant.id,
            user_id: *grant.user_id.as_uuid(),
            name: grant.name.as_ref(),
            phone: grant.phone.as_ref(),
            blood_group: grant.blood_group.as_str(),
            quantity: quantity_column(grant.quantity),
            status: grant.status.as_str(),
            ledger_entry_id: grant.ledger_entry_id,
            revision: revision_column(grant.revision),
            created_at: grant.created_at,
            updated_at: grant.updated_at,
        }
    }
}

/// Changeset written by a committed transition.
///
/// `ledger_entry_id` is written even when `None` so a retraction clears it.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = request_grants)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct GrantTransitionUpdate<'a> {
    pub status: &'a str,
    pub ledger_entry_id: Option<Uuid>,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Example data seed models
// ---------------------------------------------------------------------------

/// Insertable struct recording an applied seed.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = example_data_seeds)]
pub(crate) struct NewExampleDataSeedRow<'a> {
    pub seed_key: &'a str,
    pub seed: i64,
    pub user_count: i32,
    pub donation_count: i32,
    pub grant_count: i32,
}
