//! Blood grant requests and their status state machine.
//!
//! A grant starts `pending`. Admins move it between statuses using the
//! [`ALLOWED_TRANSITIONS`] table. Moving into `granted` materializes exactly
//! one `OUT` ledger entry, linked from the grant by id; moving from `granted`
//! to `rejected` retracts that entry. Planning is pure: adapters receive a
//! [`TransitionPlan`] and commit it atomically.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    BloodGroup, Direction, LedgerEntry, LedgerSource, PhoneNumber, Quantity, UserId, UserName,
};

/// Lifecycle status of a grant request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved; an `OUT` ledger entry exists.
    Granted,
    /// Declined.
    Rejected,
}

impl GrantStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Granted, Self::Rejected];

    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Granted => "granted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a status label is not `pending`, `granted` or `rejected`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be one of pending, granted, rejected; got {value:?}")]
pub struct GrantStatusError {
    /// The rejected label.
    pub value: String,
}

impl FromStr for GrantStatus {
    type Err = GrantStatusError;

    /// Parse a status label, ignoring ASCII case.
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::GrantStatus;
    ///
    /// assert_eq!("GRANTED".parse::<GrantStatus>(), Ok(GrantStatus::Granted));
    /// assert!("approved".parse::<GrantStatus>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GrantStatusError {
                value: s.to_owned(),
            })
    }
}

/// Source → target status pairs an admin may request.
///
/// `granted → pending` is the only pair left out. `rejected` is not terminal:
/// a rejected request may be re-granted.
pub const ALLOWED_TRANSITIONS: [(GrantStatus, GrantStatus); 8] = [
    (GrantStatus::Pending, GrantStatus::Pending),
    (GrantStatus::Pending, GrantStatus::Granted),
    (GrantStatus::Pending, GrantStatus::Rejected),
    (GrantStatus::Granted, GrantStatus::Granted),
    (GrantStatus::Granted, GrantStatus::Rejected),
    (GrantStatus::Rejected, GrantStatus::Pending),
    (GrantStatus::Rejected, GrantStatus::Granted),
    (GrantStatus::Rejected, GrantStatus::Rejected),
];

/// Whether `from → to` appears in [`ALLOWED_TRANSITIONS`].
#[must_use]
pub fn is_allowed_transition(from: GrantStatus, to: GrantStatus) -> bool {
    ALLOWED_TRANSITIONS.contains(&(from, to))
}

/// Raised when a requested transition is not in the allowed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move a grant from {from} to {to}")]
pub struct TransitionError {
    /// Current status.
    pub from: GrantStatus,
    /// Requested status.
    pub to: GrantStatus,
}

/// Validated request details supplied by a requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequestDraft {
    /// Patient or requester name.
    pub name: UserName,
    /// Contact phone.
    pub phone: PhoneNumber,
    /// Requested blood group.
    pub blood_group: BloodGroup,
    /// Requested units.
    pub quantity: Quantity,
}

/// A request for blood and its approval state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestGrant {
    /// Grant identifier.
    pub id: Uuid,
    /// Requesting user.
    pub user_id: UserId,
    /// Patient or requester name.
    pub name: UserName,
    /// Contact phone.
    pub phone: PhoneNumber,
    /// Requested blood group.
    pub blood_group: BloodGroup,
    /// Requested units.
    pub quantity: Quantity,
    /// Current status.
    pub status: GrantStatus,
    /// The `OUT` ledger entry materialized for this grant, if any.
    pub ledger_entry_id: Option<Uuid>,
    /// Optimistic concurrency counter, bumped on every committed transition.
    pub revision: u32,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last committed transition.
    pub updated_at: DateTime<Utc>,
}

/// Ledger side effect attached to a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEffect {
    /// Only the status changes.
    Unchanged,
    /// Append this `OUT` entry and link it from the grant.
    Materialize(LedgerEntry),
    /// Delete the linked entry and clear the link.
    Retract {
        /// Linked entry to delete.
        entry_id: Uuid,
    },
}

/// Everything an adapter needs to commit one transition atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// Grant being transitioned.
    pub grant_id: Uuid,
    /// Revision the plan was computed against; the commit must fail if the
    /// stored revision differs.
    pub expected_revision: u32,
    /// Status before the transition.
    pub from: GrantStatus,
    /// Status after the transition.
    pub to: GrantStatus,
    /// Ledger link after the transition.
    pub ledger_entry_id: Option<Uuid>,
    /// Ledger side effect.
    pub effect: LedgerEffect,
    /// Timestamp recorded on the grant and any new ledger entry.
    pub updated_at: DateTime<Utc>,
}

impl TransitionPlan {
    /// Whether committing the plan would change nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to && matches!(self.effect, LedgerEffect::Unchanged)
    }
}

impl RequestGrant {
    /// A fresh `pending` grant for `requester`.
    #[must_use]
    pub fn submit(requester: UserId, draft: GrantRequestDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: requester,
            name: draft.name,
            phone: draft.phone,
            blood_group: draft.blood_group,
            quantity: draft.quantity,
            status: GrantStatus::Pending,
            ledger_entry_id: None,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether an `OUT` ledger entry currently exists for this grant.
    #[must_use]
    pub const fn is_materialized(&self) -> bool {
        self.ledger_entry_id.is_some()
    }

    /// The `OUT` entry a grant materializes when approved.
    fn materialized_entry(&self, now: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            direction: Direction::Out,
            blood_group: self.blood_group,
            quantity: self.quantity,
            phone: Some(self.phone.clone()),
            source: Some(LedgerSource::Request),
            request_grant_id: Some(self.id),
            created_at: now,
        }
    }

    /// Plan a move to `requested`.
    ///
    /// # Errors
    /// Returns [`TransitionError`] when the pair is not in
    /// [`ALLOWED_TRANSITIONS`].
    ///
    /// # Examples
    /// ```
    /// use bloodbank::domain::{
    ///     BloodGroup, GrantRequestDraft, GrantStatus, LedgerEffect, PhoneNumber, Quantity,
    ///     RequestGrant, UserId, UserName,
    /// };
    /// use chrono::Utc;
    ///
    /// let draft = GrantRequestDraft {
    ///     name: UserName::new("Ward 7").expect("name"),
    ///     phone: PhoneNumber::new("9000000001").expect("phone"),
    ///     blood_group: BloodGroup::ANegative,
    ///     quantity: Quantity::new(20).expect("quantity"),
    /// };
    /// let grant = RequestGrant::submit(UserId::random(), draft, Utc::now());
    /// let plan = grant
    ///     .plan_transition(GrantStatus::Granted, Utc::now())
    ///     .expect("pending to granted is allowed");
    /// assert!(matches!(plan.effect, LedgerEffect::Materialize(_)));
    /// ```
    pub fn plan_transition(
        &self,
        requested: GrantStatus,
        now: DateTime<Utc>,
    ) -> Result<TransitionPlan, TransitionError> {
        if !is_allowed_transition(self.status, requested) {
            return Err(TransitionError {
                from: self.status,
                to: requested,
            });
        }

        let effect = match (self.status, requested, self.ledger_entry_id) {
            (_, GrantStatus::Granted, None) => LedgerEffect::Materialize(self.materialized_entry(now)),
            (GrantStatus::Granted, GrantStatus::Rejected, Some(entry_id)) => {
                LedgerEffect::Retract { entry_id }
            }
            _ => LedgerEffect::Unchanged,
        };
        let ledger_entry_id = match &effect {
            LedgerEffect::Materialize(entry) => Some(entry.id),
            LedgerEffect::Retract { .. } => None,
            LedgerEffect::Unchanged => self.ledger_entry_id,
        };

        Ok(TransitionPlan {
            grant_id: self.id,
            expected_revision: self.revision,
            from: self.status,
            to: requested,
            ledger_entry_id,
            effect,
            updated_at: now,
        })
    }

    /// Apply a committed plan to this in-memory copy.
    pub fn apply_plan(&mut self, plan: &TransitionPlan) {
        self.status = plan.to;
        self.ledger_entry_id = plan.ledger_entry_id;
        self.revision = self.revision.saturating_add(1);
        self.updated_at = plan.updated_at;
    }
}

#[cfg(test)]
#[path = "grant_tests.rs"]
mod tests;
