//! Driving port for turning a session's user id into a caller.

use async_trait::async_trait;

use crate::domain::{Error, Principal, UserId};

/// Resolves the caller's current role from the stored account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// The caller for `user_id`, or `None` when the account no longer exists.
    async fn resolve(&self, user_id: &UserId) -> Result<Option<Principal>, Error>;
}
