//! Driving port for editing the caller's own profile.

use async_trait::async_trait;

use crate::domain::{Error, Principal, ProfileUpdate, User};

/// Domain use-case port for profile edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileCommand: Send + Sync {
    /// Apply `update` to the caller's account and return the result.
    async fn update_profile(
        &self,
        principal: &Principal,
        update: ProfileUpdate,
    ) -> Result<User, Error>;
}
