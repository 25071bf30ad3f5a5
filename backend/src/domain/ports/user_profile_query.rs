//! Driving port for reading the caller's own profile.

use async_trait::async_trait;

use crate::domain::{Error, Principal, User};

/// Domain use-case port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the caller's account.
    async fn profile(&self, principal: &Principal) -> Result<User, Error>;
}
