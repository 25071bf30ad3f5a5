//! The blood ledger: append-only records of units moving in and out.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BloodGroup, PhoneNumber, Quantity, UserId};

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Units donated into the pool.
    In,
    /// Units released to a granted request.
    Out,
}

impl Direction {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }
}

/// Why a ledger entry exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LedgerSource {
    /// A donor gave blood.
    Donation,
    /// An admin granted a request.
    Request,
}

impl LedgerSource {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donation => "DONATION",
            Self::Request => "REQUEST",
        }
    }
}

/// Raised when a stored ledger label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ledger label: {value}")]
pub struct LedgerLabelError {
    /// The rejected label.
    pub value: String,
}

impl FromStr for Direction {
    type Err = LedgerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            _ => Err(LedgerLabelError {
                value: s.to_owned(),
            }),
        }
    }
}

impl FromStr for LedgerSource {
    type Err = LedgerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DONATION" => Ok(Self::Donation),
            "REQUEST" => Ok(Self::Request),
            _ => Err(LedgerLabelError {
                value: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Donor for `IN`, requester for `OUT`.
    pub user_id: UserId,
    /// Movement direction.
    pub direction: Direction,
    /// Blood group moved.
    pub blood_group: BloodGroup,
    /// Units moved.
    pub quantity: Quantity,
    /// Contact phone captured with the movement.
    pub phone: Option<PhoneNumber>,
    /// Origin of the movement.
    pub source: Option<LedgerSource>,
    /// Grant that materialized this entry; only set on `OUT` entries.
    pub request_grant_id: Option<Uuid>,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
}

/// Validated donation details supplied by a donor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonationDraft {
    /// Donated blood group.
    pub blood_group: BloodGroup,
    /// Donated units.
    pub quantity: Quantity,
    /// Donor contact phone.
    pub phone: PhoneNumber,
}

impl LedgerEntry {
    /// An `IN` entry for a donation by `donor`.
    #[must_use]
    pub fn donation(donor: UserId, draft: DonationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: donor,
            direction: Direction::In,
            blood_group: draft.blood_group,
            quantity: draft.quantity,
            phone: Some(draft.phone),
            source: Some(LedgerSource::Donation),
            request_grant_id: None,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn donation_entries_flow_in() {
        let donor = UserId::random();
        let draft = DonationDraft {
            blood_group: BloodGroup::OPositive,
            quantity: Quantity::new(50).expect("quantity"),
            phone: PhoneNumber::new("9000000001").expect("phone"),
        };

        let entry = LedgerEntry::donation(donor, draft, Utc::now());

        assert_eq!(entry.direction, Direction::In);
        assert_eq!(entry.source, Some(LedgerSource::Donation));
        assert_eq!(entry.user_id, donor);
        assert!(entry.request_grant_id.is_none());
    }

    #[rstest]
    #[case("IN", Direction::In)]
    #[case("OUT", Direction::Out)]
    fn direction_labels_round_trip(#[case] label: &str, #[case] expected: Direction) {
        assert_eq!(label.parse::<Direction>(), Ok(expected));
        assert_eq!(expected.as_str(), label);
    }

    #[rstest]
    fn unknown_labels_are_rejected() {
        assert!("in".parse::<Direction>().is_err());
        assert!("GIFT".parse::<LedgerSource>().is_err());
    }
}
