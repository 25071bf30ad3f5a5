//! Authenticated caller identity and the admin capability check.

use crate::domain::{Error, Role, UserId};

/// The caller behind a request.
///
/// Inbound adapters build this once per request from the session's user id
/// and the account's stored role; services receive it by reference and never
/// look the role up again.
///
/// # Examples
/// ```
/// use bloodbank::domain::{Principal, Role, UserId};
///
/// let donor = Principal::new(UserId::random(), Role::Regular);
/// assert!(donor.require_admin().is_err());
///
/// let admin = Principal::new(UserId::random(), Role::Admin);
/// assert!(admin.require_admin().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role: Role,
}

impl Principal {
    /// Build a principal from its claims.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// The caller's user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Whether the caller holds the admin capability.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Fail with `Unauthorized` unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::unauthorized("admin role required"))
        }
    }
}
