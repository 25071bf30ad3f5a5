//! Per-donor donation dashboard built from `IN` ledger entries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{BloodGroup, Direction, LedgerEntry, PhoneNumber, Quantity};

/// Headline figures for a donor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationTotals {
    /// Units donated overall.
    pub total_quantity_of_donations: i64,
    /// Number of donations.
    pub total_donations_count: usize,
    /// Most recent donation, if any.
    pub last_donation_at: Option<DateTime<Utc>>,
}

/// One donation in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    /// Ledger entry id.
    pub id: Uuid,
    /// Always `IN`.
    #[serde(rename = "type")]
    pub direction: Direction,
    /// Phone captured with the donation.
    pub phone: Option<PhoneNumber>,
    /// Donated group.
    pub blood_group: BloodGroup,
    /// Donated units.
    pub quantity: Quantity,
    /// Donation time.
    pub created_at: DateTime<Utc>,
}

/// Donations of one blood group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDonations {
    /// Blood group.
    pub group: BloodGroup,
    /// Units donated.
    pub quantity: i64,
    /// Number of donations.
    pub count: usize,
}

/// Dashboard returned by `GET /donation?desc=summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationSummary {
    /// Headline figures.
    pub summary: DonationTotals,
    /// Donations, newest first.
    pub history: Vec<DonationRecord>,
    /// One row per blood group in canonical order, zeros included.
    pub group_wise_breakdown: Vec<GroupDonations>,
}

impl DonationSummary {
    /// Build the dashboard from a donor's ledger entries.
    ///
    /// `OUT` entries are ignored.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = LedgerEntry>) -> Self {
        let mut history: Vec<DonationRecord> = entries
            .into_iter()
            .filter(|entry| entry.direction == Direction::In)
            .map(|entry| DonationRecord {
                id: entry.id,
                direction: entry.direction,
                phone: entry.phone,
                blood_group: entry.blood_group,
                quantity: entry.quantity,
                created_at: entry.created_at,
            })
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let group_wise_breakdown = BloodGroup::ALL
            .into_iter()
            .map(|group| {
                let donations = history.iter().filter(|record| record.blood_group == group);
                let (quantity, count) = donations.fold((0_i64, 0_usize), |(units, n), record| {
                    (units + i64::from(record.quantity.get()), n + 1)
                });
                GroupDonations {
                    group,
                    quantity,
                    count,
                }
            })
            .collect();

        let summary = DonationTotals {
            total_quantity_of_donations: history
                .iter()
                .map(|record| i64::from(record.quantity.get()))
                .sum(),
            total_donations_count: history.len(),
            last_donation_at: history.first().map(|record| record.created_at),
        };

        Self {
            summary,
            history,
            group_wise_breakdown,
        }
    }
}
