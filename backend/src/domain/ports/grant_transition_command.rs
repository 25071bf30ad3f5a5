//! Driving port for moving grants between statuses.
//!
//! The request carries raw strings so the service can apply its guards in
//! order: admin check, status recognition, record lookup, transition table.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Error, GrantStatus, Principal};

/// Raw transition request as received from an inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTransitionRequest {
    /// Grant identifier; malformed ids reference no record.
    pub grant_id: String,
    /// Requested status label, matched case-insensitively.
    pub requested_status: String,
}

/// Outcome of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GrantTransitionResponse {
    /// Grant identifier.
    pub id: Uuid,
    /// Status after the call.
    pub status: GrantStatus,
}

/// Domain use-case port for grant transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantTransitionCommand: Send + Sync {
    /// Move a grant to the requested status, committing ledger effects
    /// atomically.
    async fn transition(
        &self,
        principal: &Principal,
        request: GrantTransitionRequest,
    ) -> Result<GrantTransitionResponse, Error>;
}
