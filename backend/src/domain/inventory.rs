//! Inventory statistics folded from ledger and grant tallies.
//!
//! Adapters return pre-grouped tallies; this module turns them into the
//! per-blood-group report. Values serialize with the camelCase keys clients
//! consume.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{BloodGroup, Direction, GrantStatus, UserId};

/// Ledger totals for one `(blood group, direction, user)` bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTally {
    /// Blood group moved.
    pub blood_group: BloodGroup,
    /// Movement direction.
    pub direction: Direction,
    /// User owning the entries.
    pub user_id: UserId,
    /// Summed units.
    pub quantity: i64,
    /// Number of entries.
    pub transactions: i64,
}

/// Grant totals for one `(blood group, status)` bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTally {
    /// Requested blood group.
    pub blood_group: BloodGroup,
    /// Grant status.
    pub status: GrantStatus,
    /// Number of grants.
    pub requests: i64,
    /// Summed requested units.
    pub quantity: i64,
}

/// Ledger and grant tallies read from one consistent snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryTallies {
    /// Ledger buckets.
    pub ledger: Vec<LedgerTally>,
    /// Grant buckets.
    pub requests: Vec<RequestTally>,
}

/// Flow of units in one direction for one blood group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStats {
    /// Units moved.
    pub quantity: i64,
    /// Ledger entries.
    pub transactions: i64,
    /// Distinct users involved.
    pub unique_users: usize,
    /// Those users, sorted.
    pub user_ids: Vec<UserId>,
}

/// Request outcomes for one blood group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    /// Grants in any status.
    pub total_requests: i64,
    /// Grants currently `granted`.
    pub total_accepted_requests: i64,
    /// Units requested across all statuses.
    pub total_requested_quantity: i64,
    /// Units in `granted` grants.
    pub total_granted_quantity: i64,
    /// `granted / requested * 100`, two decimals; `0` when nothing was
    /// requested.
    pub fulfillment_percentage: f64,
}

impl RequestStats {
    /// Recompute [`Self::fulfillment_percentage`] from the quantities.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "percentages are reported as floats; unit totals stay far below 2^52"
    )]
    fn with_fulfillment(mut self) -> Self {
        self.fulfillment_percentage = if self.total_requested_quantity == 0 {
            0.0
        } else {
            let ratio =
                self.total_granted_quantity as f64 / self.total_requested_quantity as f64 * 100.0;
            (ratio * 100.0).round() / 100.0
        };
        self
    }
}

/// Report for one blood group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodGroupInventory {
    /// Donations.
    #[serde(rename = "in")]
    pub inflow: FlowStats,
    /// Units released to granted requests.
    #[serde(rename = "out")]
    pub outflow: FlowStats,
    /// Request outcomes.
    pub request_stats: RequestStats,
    /// `in.quantity - out.quantity`.
    pub net_quantity: i64,
}

/// Totals across every blood group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Units donated.
    pub total_in_quantity: i64,
    /// Units released.
    pub total_out_quantity: i64,
    /// Difference of the two.
    pub net_quantity: i64,
}

/// Inventory report returned to admins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    /// Totals across groups.
    pub summary: InventorySummary,
    /// Groups with ledger or request activity, in canonical order.
    pub by_blood_group: BTreeMap<BloodGroup, BloodGroupInventory>,
}

impl InventoryStats {
    /// Fold adapter tallies into the report.
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::{BloodGroup, Direction, InventoryStats, LedgerTally, UserId};
    ///
    /// let donor = UserId::random();
    /// let tally = |direction, quantity| LedgerTally {
    ///     blood_group: BloodGroup::OPositive,
    ///     direction,
    ///     user_id: donor,
    ///     quantity,
    ///     transactions: 1,
    /// };
    /// let stats = InventoryStats::from_tallies(
    ///     &[tally(Direction::In, 150), tally(Direction::Out, 30)],
    ///     &[],
    /// );
    /// assert_eq!(stats.summary.net_quantity, 120);
    /// ```
    #[must_use]
    pub fn from_tallies(ledger: &[LedgerTally], requests: &[RequestTally]) -> Self {
        let mut users: BTreeMap<(BloodGroup, Direction), BTreeSet<UserId>> = BTreeMap::new();
        let mut groups: BTreeMap<BloodGroup, BloodGroupInventory> = BTreeMap::new();

        for tally in ledger {
            let group = groups.entry(tally.blood_group).or_default();
            let flow = match tally.direction {
                Direction::In => &mut group.inflow,
                Direction::Out => &mut group.outflow,
            };
            flow.quantity += tally.quantity;
            flow.transactions += tally.transactions;
            users
                .entry((tally.blood_group, tally.direction))
                .or_default()
                .insert(tally.user_id);
        }

        for tally in requests {
            let stats = &mut groups.entry(tally.blood_group).or_default().request_stats;
            stats.total_requests += tally.requests;
            stats.total_requested_quantity += tally.quantity;
            if tally.status == GrantStatus::Granted {
                stats.total_accepted_requests += tally.requests;
                stats.total_granted_quantity += tally.quantity;
            }
        }

        for ((blood_group, direction), ids) in users {
            if let Some(group) = groups.get_mut(&blood_group) {
                let flow = match direction {
                    Direction::In => &mut group.inflow,
                    Direction::Out => &mut group.outflow,
                };
                flow.unique_users = ids.len();
                flow.user_ids = ids.into_iter().collect();
            }
        }

        let mut summary = InventorySummary::default();
        for group in groups.values_mut() {
            group.net_quantity = group.inflow.quantity - group.outflow.quantity;
            group.request_stats = std::mem::take(&mut group.request_stats).with_fulfillment();
            summary.total_in_quantity += group.inflow.quantity;
            summary.total_out_quantity += group.outflow.quantity;
        }
        summary.net_quantity = summary.total_in_quantity - summary.total_out_quantity;

        Self {
            summary,
            by_blood_group: groups,
        }
    }
}
