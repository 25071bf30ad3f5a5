//! Port for grant persistence and atomic transition commits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{RequestGrant, TransitionPlan};

use super::define_port_error;

define_port_error! {
    /// Errors raised by grant repository adapters.
    pub enum GrantRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "grant repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "grant repository query failed: {message}",
        /// The grant changed after the plan was computed.
        RevisionMismatch { grant_id: Uuid, expected: u32 } =>
            "grant {grant_id} is no longer at revision {expected}",
    }
}

/// Port for request grants.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantRepository: Send + Sync {
    /// Persist a freshly submitted grant.
    async fn create(&self, grant: &RequestGrant) -> Result<(), GrantRepositoryError>;

    /// Fetch a grant by id.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<RequestGrant>, GrantRepositoryError>;

    /// Every grant, newest first.
    async fn list_all(&self) -> Result<Vec<RequestGrant>, GrantRepositoryError>;

    /// Commit a transition and its ledger effect as one unit of work.
    ///
    /// Implementations must:
    /// - update the grant only if its stored revision equals
    ///   `plan.expected_revision`, bumping the revision;
    /// - insert the materialized entry or delete the retracted entry by id in
    ///   the same transaction;
    /// - roll everything back and return
    ///   [`GrantRepositoryError::RevisionMismatch`] when the revision moved.
    async fn commit_transition(&self, plan: &TransitionPlan) -> Result<(), GrantRepositoryError>;
}
