//! Driving port for listing blood requests.

use async_trait::async_trait;

use crate::domain::{Error, Principal, RequestGrant};

/// Domain use-case port for request reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GrantRequestQuery: Send + Sync {
    /// Every grant, newest first. Admin only.
    async fn list_requests(&self, principal: &Principal) -> Result<Vec<RequestGrant>, Error>;
}
