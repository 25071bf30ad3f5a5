//! Grant request service: submission, listing and status transitions.
//!
//! Transitions are planned in the domain from a fresh read and committed by
//! the repository under an optimistic revision check. A lost race is
//! replanned from the new state up to [`MAX_TRANSITION_ATTEMPTS`] times.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::ports::{
    GrantRepository, GrantRepositoryError, GrantRequestCommand, GrantRequestQuery,
    GrantTransitionCommand, GrantTransitionRequest, GrantTransitionResponse,
};
use crate::domain::{
    Error, GrantRequestDraft, GrantStatus, LedgerEffect, Principal, RequestGrant, TransitionError,
};

/// Commit attempts before a contended transition gives up with `Conflict`.
pub const MAX_TRANSITION_ATTEMPTS: u32 = 3;

fn map_repository_error(error: GrantRepositoryError) -> Error {
    match error {
        GrantRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("grant repository unavailable: {message}"))
        }
        GrantRepositoryError::Query { message } => {
            Error::internal(format!("grant repository error: {message}"))
        }
        GrantRepositoryError::RevisionMismatch { grant_id, .. } => {
            Error::conflict(format!("grant {grant_id} was modified concurrently"))
        }
    }
}

fn invalid_status(raw: &str) -> Error {
    Error::invalid_request("status must be one of pending, granted, rejected").with_details(
        json!({
            "field": "status",
            "code": "invalid_status",
            "value": raw,
        }),
    )
}

fn invalid_transition(error: &TransitionError) -> Error {
    Error::invalid_transition(error.to_string()).with_details(json!({
        "from": error.from.as_str(),
        "to": error.to.as_str(),
    }))
}

fn grant_not_found(raw_id: &str) -> Error {
    Error::not_found(format!("request {raw_id} not found"))
}

/// Grant service implementing the request and transition driving ports.
#[derive(Clone)]
pub struct GrantRequestService<R> {
    grants: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> GrantRequestService<R> {
    /// Create the service over a grant repository.
    pub fn new(grants: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { grants, clock }
    }
}

#[async_trait]
impl<R> GrantRequestCommand for GrantRequestService<R>
where
    R: GrantRepository,
{
    async fn submit_request(
        &self,
        principal: &Principal,
        draft: GrantRequestDraft,
    ) -> Result<RequestGrant, Error> {
        let grant = RequestGrant::submit(*principal.user_id(), draft, self.clock.utc());
        self.grants
            .create(&grant)
            .await
            .map_err(map_repository_error)?;

        info!(
            grant_id = %grant.id,
            user_id = %grant.user_id,
            blood_group = grant.blood_group.as_str(),
            quantity = grant.quantity.get(),
            "blood request submitted"
        );
        Ok(grant)
    }
}

#[async_trait]
impl<R> GrantRequestQuery for GrantRequestService<R>
where
    R: GrantRepository,
{
    async fn list_requests(&self, principal: &Principal) -> Result<Vec<RequestGrant>, Error> {
        principal.require_admin()?;
        self.grants.list_all().await.map_err(map_repository_error)
    }
}

#[async_trait]
impl<R> GrantTransitionCommand for GrantRequestService<R>
where
    R: GrantRepository,
{
    async fn transition(
        &self,
        principal: &Principal,
        request: GrantTransitionRequest,
    ) -> Result<GrantTransitionResponse, Error> {
        principal.require_admin()?;
        let requested: GrantStatus = request
            .requested_status
            .parse()
            .map_err(|_| invalid_status(&request.requested_status))?;
        let grant_id =
            Uuid::parse_str(&request.grant_id).map_err(|_| grant_not_found(&request.grant_id))?;

        for attempt in 1..=MAX_TRANSITION_ATTEMPTS {
            let grant = self
                .grants
                .find_by_id(&grant_id)
                .await
                .map_err(map_repository_error)?
                .ok_or_else(|| grant_not_found(&request.grant_id))?;
            let plan = grant
                .plan_transition(requested, self.clock.utc())
                .map_err(|err| invalid_transition(&err))?;
            let response = GrantTransitionResponse {
                id: grant_id,
                status: plan.to,
            };

            if plan.is_noop() {
                debug!(%grant_id, status = requested.as_str(), "grant already in requested status");
                return Ok(response);
            }

            match self.grants.commit_transition(&plan).await {
                Ok(()) => {
                    let ledger_effect = match &plan.effect {
                        LedgerEffect::Unchanged => "unchanged",
                        LedgerEffect::Materialize(_) => "materialized",
                        LedgerEffect::Retract { .. } => "retracted",
                    };
                    info!(
                        %grant_id,
                        acting_user = %principal.user_id(),
                        from = plan.from.as_str(),
                        to = plan.to.as_str(),
                        ledger_effect,
                        "grant status changed"
                    );
                    return Ok(response);
                }
                Err(GrantRepositoryError::RevisionMismatch { .. }) => {
                    warn!(%grant_id, attempt, "grant changed during transition; replanning");
                }
                Err(other) => return Err(map_repository_error(other)),
            }
        }

        Err(Error::conflict(format!(
            "request {grant_id} kept changing; gave up after {MAX_TRANSITION_ATTEMPTS} attempts"
        )))
    }
}

#[cfg(test)]
#[path = "grant_request_service_tests.rs"]
mod tests;
