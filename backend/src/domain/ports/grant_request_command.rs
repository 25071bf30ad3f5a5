//! Driving port for submitting blood requests.

use async_trait::async_trait;

use crate::domain::{Error, GrantRequestDraft, Principal, RequestGrant};

/// Domain use-case port for request submission.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantRequestCommand: Send + Sync {
    /// Create a `pending` grant owned by the caller.
    async fn submit_request(
        &self,
        principal: &Principal,
        draft: GrantRequestDraft,
    ) -> Result<RequestGrant, Error>;
}
