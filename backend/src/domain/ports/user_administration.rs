//! Driving port for admin-only user management.

use async_trait::async_trait;

use crate::domain::{Error, Principal, Role, User, UserId};

/// Domain use-case port for user administration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdministration: Send + Sync {
    /// Every account. Admin only.
    async fn list_users(&self, principal: &Principal) -> Result<Vec<User>, Error>;

    /// Change `user_id`'s role. Admin only; `NotFound` for unknown users.
    async fn assign_role(
        &self,
        principal: &Principal,
        user_id: UserId,
        role: Role,
    ) -> Result<(), Error>;
}
